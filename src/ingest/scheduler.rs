// src/ingest/scheduler.rs
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Duration, FixedOffset, NaiveTime, TimeZone};
use metrics::counter;
use tokio::task::JoinHandle;

use crate::jobs::Relay;

/// Next local instant at `at`: today if still ahead of `now`, else tomorrow.
pub fn next_daily_run(now: DateTime<FixedOffset>, at: NaiveTime) -> DateTime<FixedOffset> {
    let tz = *now.offset();
    let today = now.date_naive().and_time(at);
    // A fixed offset has no gaps or folds, so this is always `Single`.
    let candidate = tz
        .from_local_datetime(&today)
        .single()
        .unwrap_or_else(|| now + Duration::days(1));
    if candidate > now {
        candidate
    } else {
        candidate + Duration::days(1)
    }
}

fn until(target: DateTime<FixedOffset>, now: DateTime<FixedOffset>) -> std::time::Duration {
    (target - now).to_std().unwrap_or_default()
}

/// Spawn the single loop that owns both triggers. Passes never overlap.
pub fn spawn_scheduler(relay: Arc<Relay>) -> Result<JoinHandle<()>> {
    let digest_at = relay.digest.at_time()?;
    let interval = std::time::Duration::from_secs(relay.realtime.interval_minutes.max(1) * 60);

    Ok(tokio::spawn(async move {
        relay.announce_startup().await;

        if relay.realtime.enabled && relay.realtime.run_on_startup {
            relay.run_realtime().await;
            counter!("scheduler_passes_total", "job" => "realtime").increment(1);
        }
        if relay.digest.enabled && relay.digest.run_on_startup {
            relay.run_digest().await;
            counter!("scheduler_passes_total", "job" => "digest").increment(1);
        }

        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        let mut next_digest = next_daily_run(relay.ctx.now_local(), digest_at);
        loop {
            tracing::debug!(target: "scheduler", next_digest = %next_digest, "waiting for next trigger");
            let digest_sleep = tokio::time::sleep(until(next_digest, relay.ctx.now_local()));

            tokio::select! {
                _ = ticker.tick(), if relay.realtime.enabled => {
                    relay.run_realtime().await;
                    counter!("scheduler_passes_total", "job" => "realtime").increment(1);
                }
                _ = digest_sleep, if relay.digest.enabled => {
                    relay.run_digest().await;
                    counter!("scheduler_passes_total", "job" => "digest").increment(1);
                    next_digest = next_daily_run(relay.ctx.now_local(), digest_at);
                }
                else => {
                    tracing::warn!(target: "scheduler", "both jobs disabled, scheduler exiting");
                    break;
                }
            }
        }
    }))
}
