// src/jobs.rs
//! The two recurring jobs plus the startup announcement.

use std::sync::Arc;

use crate::config::watch::{DigestCfg, RealtimeCfg};
use crate::context::WatchContext;
use crate::history::{JobKind, PassHistory, PassSummary};
use crate::ingest::types::SourceProvider;
use crate::ingest::{collect_pass, PassOutcome};
use crate::notify::format::{digest_messages, realtime_message};
use crate::notify::{
    DeliveryReport, DispatchQueue, LinkShortener, Notifier, OutgoingMessage, ScheduledDelivery,
};

pub struct Relay {
    pub ctx: WatchContext,
    pub providers: Vec<Box<dyn SourceProvider>>,
    pub notifier: Arc<dyn Notifier>,
    pub shortener: Arc<dyn LinkShortener>,
    /// Required when `realtime.delay_minutes` is set.
    pub queue: Option<DispatchQueue>,
    pub realtime: RealtimeCfg,
    pub digest: DigestCfg,
    pub startup_message: Option<String>,
    pub history: Arc<PassHistory>,
}

impl Relay {
    pub async fn announce_startup(&self) {
        let Some(text) = self.startup_message.as_deref() else {
            return;
        };
        let report = self.notifier.deliver(&OutgoingMessage::text(text)).await;
        tracing::info!(
            target: "scheduler",
            delivered = report.delivered,
            failed = report.failed,
            "startup announcement sent"
        );
    }

    /// One realtime pass. Accepted items go out newest first, either now or
    /// through the dispatch queue.
    pub async fn run_realtime(&self) -> PassOutcome {
        let outcome = collect_pass(&self.ctx, &self.providers, &self.realtime.policy()).await;
        let mut report = DeliveryReport::default();

        if outcome.items.is_empty() {
            tracing::info!(target: "scheduler", "realtime: no new items");
        }

        let delay = self.realtime.delay();
        for item in &outcome.items {
            let link = self.shortener.shorten(item.link()).await;
            let msg = realtime_message(item, &link);
            match (delay, &self.queue) {
                (Some(d), Some(queue)) => {
                    queue.submit(ScheduledDelivery::after(d, msg));
                    tracing::info!(target: "scheduler", link = item.link(), delay_secs = d.as_secs(), "queued for delayed delivery");
                }
                (Some(_), None) => {
                    tracing::warn!(target: "scheduler", "delay configured but no dispatch queue, sending now");
                    report.merge(self.notifier.deliver(&msg).await);
                }
                (None, _) => report.merge(self.notifier.deliver(&msg).await),
            }
        }

        self.record(JobKind::Realtime, &outcome, report);
        outcome
    }

    /// One digest pass over the digest window; always sends something.
    pub async fn run_digest(&self) -> PassOutcome {
        let outcome = collect_pass(&self.ctx, &self.providers, &self.digest.policy()).await;

        let mut entries = Vec::with_capacity(outcome.items.len().min(self.digest.max_items));
        for item in outcome.items.iter().take(self.digest.max_items) {
            let link = self.shortener.shorten(item.link()).await;
            entries.push((item.clone(), link));
        }
        if outcome.items.len() > entries.len() {
            tracing::info!(
                target: "scheduler",
                omitted = outcome.items.len() - entries.len(),
                "digest truncated to max_items"
            );
        }

        let mut report = DeliveryReport::default();
        for msg in digest_messages(
            &self.digest.title,
            self.ctx.now_local(),
            self.digest.window_hours,
            &entries,
        ) {
            report.merge(self.notifier.deliver(&msg).await);
        }

        self.record(JobKind::Digest, &outcome, report);
        outcome
    }

    fn record(&self, job: JobKind, outcome: &PassOutcome, report: DeliveryReport) {
        self.history.push(PassSummary {
            job,
            finished_at: self.ctx.now_local(),
            stats: outcome.stats.clone(),
            delivered: report.delivered,
            failed_deliveries: report.failed,
        });
    }
}
