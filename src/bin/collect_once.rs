// src/bin/collect_once.rs
//! Dry run: one realtime-policy pass against the live sources with an
//! in-memory store. Prints what would be announced; sends nothing.
//!
//! `cargo run --bin collect_once -- [digest]`

use std::sync::Arc;

use mention_relay::{
    collect_pass,
    config::{Secrets, WatchConfig},
    context::SystemClock,
    ingest::providers::{build_providers, http_client},
    init_tracing, SeenLinkStore, WatchContext,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let use_digest = std::env::args().nth(1).is_some_and(|a| a == "digest");

    let cfg = WatchConfig::load_default()?;
    let secrets = Secrets::from_env();
    let client = http_client(std::time::Duration::from_secs(cfg.general.http_timeout_secs))?;
    let providers = build_providers(&cfg, &secrets, &client);

    let ctx = WatchContext::new(
        Arc::new(SeenLinkStore::in_memory()),
        Arc::new(SystemClock),
        cfg.keywords.matcher()?,
        cfg.general.tz()?,
    );
    let policy = if use_digest {
        cfg.digest.policy()
    } else {
        cfg.realtime.policy()
    };

    let outcome = collect_pass(&ctx, &providers, &policy).await;
    for item in &outcome.items {
        println!(
            "{}  [{}]  {}\n    {}",
            item.published_at().format("%Y-%m-%d %H:%M"),
            item.source(),
            item.title(),
            item.link()
        );
    }
    println!("{}", serde_json::to_string_pretty(&outcome.stats)?);
    Ok(())
}
