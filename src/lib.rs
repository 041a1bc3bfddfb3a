// src/lib.rs
// Public library surface for the service entry, the dry-run bin and integration tests.

pub mod api;
pub mod config;
pub mod context;
pub mod freshness;
pub mod history;
pub mod ingest;
pub mod jobs;
pub mod metrics;
pub mod notify;
pub mod relevance;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::config::{Secrets, WatchConfig};
pub use crate::context::{Clock, FixedClock, SystemClock, WatchContext};
pub use crate::ingest::store::SeenLinkStore;
pub use crate::ingest::{collect_pass, PassOutcome, PassStats};
pub use crate::jobs::Relay;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::history::PassHistory;
use crate::ingest::providers::{build_providers, http_client};
use crate::notify::{
    DispatchQueue, IsGdShortener, LinkShortener, LogNotifier, NoopShortener, Notifier,
    TelegramNotifier,
};

pub const DEFAULT_LOG_FILTER: &str = "mention_relay=info,warn";

/// Install the global subscriber. `LOG_FORMAT=json` switches to JSON lines.
/// Safe to call twice; the second call is a no-op.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    let res = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
    if res.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Wire config and secrets into a ready-to-schedule relay. Must run inside a
/// tokio runtime (the dispatch queue actor is spawned here when a delay is set).
pub fn build_relay(
    cfg: &WatchConfig,
    secrets: &Secrets,
    clock: Arc<dyn Clock>,
    history: Arc<PassHistory>,
) -> anyhow::Result<Relay> {
    cfg.validate().context("invalid watch config")?;
    let tz = cfg.general.tz()?;
    let keywords = cfg.keywords.matcher().context("building keyword matcher")?;
    let store = Arc::new(SeenLinkStore::open(&cfg.general.store_path));

    let client = http_client(std::time::Duration::from_secs(cfg.general.http_timeout_secs))?;
    let providers = build_providers(cfg, secrets, &client);

    let notifier: Arc<dyn Notifier> = match (&secrets.telegram_bot_token, secrets.telegram_enabled()) {
        (Some(token), true) => Arc::new(TelegramNotifier::new(
            client.clone(),
            cfg.telegram.api_base.clone(),
            token.clone(),
            secrets.telegram_chat_ids.clone(),
        )),
        _ => {
            tracing::warn!("telegram not configured, messages will only be logged");
            Arc::new(LogNotifier)
        }
    };

    let shortener: Arc<dyn LinkShortener> = if cfg.shortener.enabled {
        Arc::new(IsGdShortener::new(client.clone(), cfg.shortener.endpoint.clone()))
    } else {
        Arc::new(NoopShortener)
    };

    let queue = cfg.realtime.delay().map(|_| DispatchQueue::spawn(Arc::clone(&notifier)).0);

    tracing::info!(
        sources = providers.len(),
        notifier = notifier.name(),
        delayed = queue.is_some(),
        "relay ready"
    );

    Ok(Relay {
        ctx: WatchContext::new(store, clock, keywords, tz),
        providers,
        notifier,
        shortener,
        queue,
        realtime: cfg.realtime.clone(),
        digest: cfg.digest.clone(),
        startup_message: cfg.general.startup_message.clone(),
        history,
    })
}
