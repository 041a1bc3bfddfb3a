// src/notify/shortener.rs
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

pub const SHORTENER_TIMEOUT: Duration = Duration::from_secs(5);

/// Shortening is best effort: implementations return the input on failure.
#[async_trait]
pub trait LinkShortener: Send + Sync {
    async fn shorten(&self, url: &str) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopShortener;

#[async_trait]
impl LinkShortener for NoopShortener {
    async fn shorten(&self, url: &str) -> String {
        url.to_string()
    }
}

/// is.gd `create.php?format=simple&url=..`, which answers with the short URL
/// as plain text.
pub struct IsGdShortener {
    client: Client,
    endpoint: String,
}

impl IsGdShortener {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    async fn try_shorten(&self, url: &str) -> anyhow::Result<String> {
        let body = self
            .client
            .get(&self.endpoint)
            .query(&[("format", "simple"), ("url", url)])
            .timeout(SHORTENER_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let short = body.trim();
        if !(short.starts_with("http://") || short.starts_with("https://")) {
            anyhow::bail!("shortener answered with a non-URL body: {short:.80}");
        }
        Ok(short.to_string())
    }
}

#[async_trait]
impl LinkShortener for IsGdShortener {
    async fn shorten(&self, url: &str) -> String {
        match self.try_shorten(url).await {
            Ok(short) => short,
            Err(e) => {
                tracing::debug!(target: "notify", url, error = ?e, "shortening failed, keeping long link");
                url.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_endpoint_keeps_url() {
        let s = IsGdShortener::new(Client::new(), "http://127.0.0.1:9/create.php");
        assert_eq!(s.shorten("https://n/1").await, "https://n/1");
    }

    #[tokio::test]
    async fn noop_returns_input() {
        assert_eq!(NoopShortener.shorten("https://n/2").await, "https://n/2");
    }
}
