//! mention-relay service entrypoint.
//! Loads configuration, starts the pass scheduler, and serves the
//! health/debug/metrics router through Shuttle.

use std::sync::Arc;

use mention_relay::{
    api::{self, AppState},
    build_relay,
    config::{Secrets, WatchConfig},
    context::SystemClock,
    history::PassHistory,
    ingest::scheduler::spawn_scheduler,
    init_tracing,
};
use shuttle_axum::ShuttleAxum;

const HISTORY_CAPACITY: usize = 500;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = WatchConfig::load_default()?;
    let secrets = Secrets::from_env();
    tracing::info!(?secrets, sources = cfg.sources.len(), "configuration loaded");

    let history = Arc::new(PassHistory::with_capacity(HISTORY_CAPACITY));
    let mut state = AppState::new(Arc::clone(&history));
    // Before the scheduler, so the startup passes are counted.
    match mention_relay::metrics::install_recorder() {
        Ok(handle) => state = state.with_metrics(handle),
        Err(e) => tracing::warn!(error = ?e, "metrics disabled"),
    }

    let relay = build_relay(&cfg, &secrets, Arc::new(SystemClock), history)?;
    let _scheduler = spawn_scheduler(Arc::new(relay))?;

    Ok(api::router(state).into())
}
