use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use dashmap::DashMap;
use litekv_core::Envelope;

struct Counter {
    count: u32,
    window_start: Instant,
}

/// A fixed-window, per-IP request counter, backed by the same
/// `DashMap`-as-concurrent-counter-table pattern the reference
/// architecture's cache backends use for hit/miss statistics.
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    counters: DashMap<IpAddr, Counter>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            counters: DashMap::new(),
        }
    }

    /// Default of 100 requests per 60-second window.
    pub fn with_defaults() -> Self {
        Self::new(100, Duration::from_secs(60))
    }

    fn allow(&self, ip: IpAddr) -> bool {
        let now = Instant::now();
        let mut entry = self
            .counters
            .entry(ip)
            .or_insert_with(|| Counter {
                count: 0,
                window_start: now,
            });
        if now.duration_since(entry.window_start) >= self.window {
            entry.count = 0;
            entry.window_start = now;
        }
        entry.count += 1;
        entry.count <= self.max_requests
    }
}

/// Applies a [`RateLimiter`] to every request on `router` at `state`,
/// rejecting over-quota requests with `429` before they reach a handler.
pub fn with_rate_limiting<S>(router: Router<S>, limiter: Arc<RateLimiter>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(axum::middleware::from_fn_with_state(limiter, rate_limit_middleware))
}

async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    req: axum::extract::Request,
    next: Next,
) -> Response {
    // Falls back to loopback when the server was not bound with
    // `into_make_service_with_connect_info` (e.g. in unit tests driven
    // directly via `ServiceExt::oneshot`) rather than rejecting the
    // request outright.
    let ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::from([127, 0, 0, 1]));

    if !limiter.allow(ip) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(Envelope::<()>::err("rate limit exceeded")),
        )
            .into_response();
    }
    next.run(req).await
}
