// src/ingest/providers/mod.rs
pub mod feed;
pub mod video_search;

use std::time::Duration;

use anyhow::{Context, Result};

use crate::config::{Secrets, SourceKind, WatchConfig};
use crate::ingest::types::SourceProvider;

use self::feed::FeedProvider;
use self::video_search::{VideoSearchProvider, VideoSearchQuery};

/// Shared HTTP client for every source.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("mention-relay/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("building http client")
}

/// Build providers in configured order. Sources that cannot run (missing API
/// key) are skipped with a warning.
pub fn build_providers(
    cfg: &WatchConfig,
    secrets: &Secrets,
    client: &reqwest::Client,
) -> Vec<Box<dyn SourceProvider>> {
    let mut out: Vec<Box<dyn SourceProvider>> = Vec::with_capacity(cfg.sources.len());
    for src in &cfg.sources {
        match src.kind {
            SourceKind::Feed => out.push(Box::new(FeedProvider::from_url(
                src.label.clone(),
                src.url.clone(),
                client.clone(),
                src.rule,
            ))),
            SourceKind::VideoSearch => {
                let Some(key) = secrets.rapid_api_key.clone() else {
                    tracing::warn!(target: "ingest", source = %src.label, "no RAPID_API_KEY, video search source disabled");
                    continue;
                };
                let query = VideoSearchQuery {
                    keywords: src.query.clone().unwrap_or_default(),
                    region: src.region.clone(),
                    count: src.count,
                };
                out.push(Box::new(VideoSearchProvider::from_endpoint(
                    src.label.clone(),
                    src.url.clone(),
                    key,
                    query,
                    client.clone(),
                    src.rule,
                )));
            }
        }
    }
    out
}
