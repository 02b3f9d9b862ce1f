use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use litekv_core::{Envelope, Error, Result, Value};
use litekv_store::StorageEntry;
use serde_json::json;

use crate::client::StorageClient;

const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(2);
const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(5);

/// A [`StorageClient`] that reaches a `litekv-store` server over HTTP.
pub struct HttpStorageClient {
    base_url: String,
    client: reqwest::Client,
    health_timeout: Duration,
    io_timeout: Duration,
    enabled: AtomicBool,
}

impl HttpStorageClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeouts(base_url, DEFAULT_HEALTH_TIMEOUT, DEFAULT_IO_TIMEOUT)
    }

    pub fn with_timeouts(
        base_url: impl Into<String>,
        health_timeout: Duration,
        io_timeout: Duration,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
            health_timeout,
            io_timeout,
            enabled: AtomicBool::new(true),
        }
    }

    fn data_url(&self, key: &str) -> String {
        format!("{}/api/data/{}", self.base_url, urlencoding_key(key))
    }

    fn guard(&self) -> Result<()> {
        if !self.is_enabled() {
            return Err(Error::Unavailable("storage client is disabled".into()));
        }
        Ok(())
    }
}

/// Minimal path-segment escaping; keys are arbitrary UTF-8 strings and must
/// not be allowed to smuggle extra path segments into the request.
fn urlencoding_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[async_trait]
impl StorageClient for HttpStorageClient {
    async fn available(&self) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let url = format!("{}/api/health", self.base_url);
        matches!(
            self.client.get(&url).timeout(self.health_timeout).send().await,
            Ok(resp) if resp.status().is_success()
        )
    }

    async fn save(&self, key: &str, value: Value) -> Result<StorageEntry> {
        self.guard()?;
        let resp = self
            .client
            .post(self.data_url(key))
            .timeout(self.io_timeout)
            .json(&json!({ "value": value.to_json() }))
            .send()
            .await
            .map_err(|err| Error::Unavailable(err.to_string()))?;
        parse_entry_envelope(resp).await
    }

    async fn load(&self, key: &str) -> Result<Option<StorageEntry>> {
        self.guard()?;
        let resp = self
            .client
            .get(self.data_url(key))
            .timeout(self.io_timeout)
            .send()
            .await
            .map_err(|err| Error::Unavailable(err.to_string()))?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        parse_entry_envelope(resp).await.map(Some)
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.guard()?;
        let resp = self
            .client
            .delete(self.data_url(key))
            .timeout(self.io_timeout)
            .send()
            .await
            .map_err(|err| Error::Unavailable(err.to_string()))?;
        Ok(resp.status().is_success())
    }

    fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }

    fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }
}

async fn parse_entry_envelope(resp: reqwest::Response) -> Result<StorageEntry> {
    if !resp.status().is_success() {
        return Err(Error::Unavailable(format!(
            "store responded with status {}",
            resp.status()
        )));
    }
    let envelope: Envelope<StorageEntry> = resp
        .json()
        .await
        .map_err(|err| Error::Unavailable(err.to_string()))?;
    envelope
        .data
        .ok_or_else(|| Error::Unavailable(envelope.error.unwrap_or_else(|| "empty response".into())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urlencoding_key_escapes_path_separators() {
        assert_eq!(urlencoding_key("a/b"), "a%2Fb");
        assert_eq!(urlencoding_key("plain-key_1.0~"), "plain-key_1.0~");
    }

    #[tokio::test]
    async fn disabled_client_fails_every_data_call_without_io() {
        let client = HttpStorageClient::new("http://127.0.0.1:0");
        client.disable();
        assert!(!client.available().await);
        assert!(client.save("a", Value::Int(1)).await.is_err());
        assert!(client.load("a").await.is_err());
        assert!(client.delete("a").await.is_err());
    }
}
