use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use litekv_api::{build_cache_server, CacheAppState};
use litekv_cache::{spawn_sweeper, CacheConfig, CacheEngine, DEFAULT_SWEEP_INTERVAL};
use litekv_cli::config::CacheServerConfig;
use litekv_client::{HttpStorageClient, StorageClient};
use tokio::signal;
use tokio::sync::Mutex;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("litekv=info".parse()?),
        )
        .init();

    let config = CacheServerConfig::from_env();
    info!(port = config.port, "starting litekv cache server");

    let storage: Option<Arc<dyn StorageClient>> = config
        .storage_service_url
        .as_ref()
        .map(|url| Arc::new(HttpStorageClient::new(url.clone())) as Arc<dyn StorageClient>);

    let cache_config = CacheConfig {
        max_size: config.max_cache_size,
        default_ttl_seconds: config.default_ttl_seconds,
    };
    let cache = Arc::new(Mutex::new(CacheEngine::new(cache_config)));
    let sweeper = spawn_sweeper(cache.clone(), DEFAULT_SWEEP_INTERVAL);

    let state = Arc::new(CacheAppState { cache, storage });

    let app = build_cache_server(
        state,
        config.rate_limit_max_requests,
        config.rate_limit_window(),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "cache server listening");

    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal());

    if let Err(err) = server.await {
        error!(error = %err, "cache server exited with an error");
        return Err(err.into());
    }

    info!("cache server stopping, stopping sweeper");
    sweeper.stop().await;
    info!("cache server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("received shutdown signal, stopping cache server"),
        Err(err) => error!(error = %err, "unable to listen for shutdown signal"),
    }
}
