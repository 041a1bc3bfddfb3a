// src/ingest/mod.rs
pub mod normalize;
pub mod providers;
pub mod scheduler;
pub mod store;
pub mod types;

use std::collections::HashSet;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::context::WatchContext;
use crate::freshness::{self, Freshness, FreshnessPolicy};
use crate::ingest::normalize::{normalize_link, normalize_title};
use crate::ingest::types::{AcceptedItem, CandidateItem, RawEntry, SourceProvider};
use crate::relevance::RelevanceRule;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_entries_total", "Raw entries returned by providers.");
        describe_counter!("ingest_accepted_total", "Entries accepted and recorded as seen.");
        describe_counter!(
            "ingest_rejected_total",
            "Entries rejected, labelled by reason."
        );
        describe_counter!(
            "ingest_source_errors_total",
            "Provider fetch/parse errors."
        );
        describe_histogram!("ingest_fetch_ms", "Provider fetch time in milliseconds.");
        describe_gauge!(
            "ingest_pass_last_run_ts",
            "Unix ts when a collection pass last finished."
        );
    });
}

/// Why an entry did not make it into the result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Empty,
    SeenLink,
    DuplicateTitle,
    Irrelevant,
    Stale,
    NotRecent,
}

impl Rejection {
    pub fn as_str(self) -> &'static str {
        match self {
            Rejection::Empty => "empty",
            Rejection::SeenLink => "seen_link",
            Rejection::DuplicateTitle => "duplicate_title",
            Rejection::Irrelevant => "irrelevant",
            Rejection::Stale => "stale",
            Rejection::NotRecent => "not_recent",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassStats {
    pub fetched: usize,
    pub accepted: usize,
    pub empty: usize,
    pub seen_link: usize,
    pub duplicate_title: usize,
    pub irrelevant: usize,
    pub stale: usize,
    pub not_recent: usize,
    pub failed_sources: Vec<String>,
}

impl PassStats {
    fn reject(&mut self, why: Rejection) {
        match why {
            Rejection::Empty => self.empty += 1,
            Rejection::SeenLink => self.seen_link += 1,
            Rejection::DuplicateTitle => self.duplicate_title += 1,
            Rejection::Irrelevant => self.irrelevant += 1,
            Rejection::Stale => self.stale += 1,
            Rejection::NotRecent => self.not_recent += 1,
        }
        counter!("ingest_rejected_total", "reason" => why.as_str()).increment(1);
    }
}

#[derive(Debug, Clone, Default)]
pub struct PassOutcome {
    /// Newest first.
    pub items: Vec<AcceptedItem>,
    pub stats: PassStats,
}

/// Per-pass dedup state layered on top of the durable store.
struct PassFilter<'a> {
    ctx: &'a WatchContext,
    policy: &'a FreshnessPolicy,
    seen_titles: HashSet<String>,
}

impl<'a> PassFilter<'a> {
    fn new(ctx: &'a WatchContext, policy: &'a FreshnessPolicy) -> Self {
        Self {
            ctx,
            policy,
            seen_titles: HashSet::new(),
        }
    }

    /// Run one entry through dedup, relevance and freshness. On acceptance the
    /// link is already persisted when this returns.
    fn admit(
        &mut self,
        source: &str,
        rule: RelevanceRule,
        entry: RawEntry,
    ) -> Result<AcceptedItem, Rejection> {
        let title = entry.title.trim();
        if title.is_empty() {
            return Err(Rejection::Empty);
        }
        let norm_link = normalize_link(&entry.link);
        if norm_link.is_empty() {
            return Err(Rejection::Empty);
        }
        let norm_title = normalize_title(title);

        if self.ctx.store.contains(&norm_link) {
            return Err(Rejection::SeenLink);
        }
        if self.seen_titles.contains(&norm_title) {
            return Err(Rejection::DuplicateTitle);
        }
        if !self.ctx.keywords.accepts(rule, title, &norm_link) {
            return Err(Rejection::Irrelevant);
        }

        let now = self.ctx.clock.now();
        let published_at = freshness::localize(entry.published, now, self.ctx.tz);
        match self.policy.check(published_at, now.with_timezone(&self.ctx.tz)) {
            Freshness::Fresh => {}
            Freshness::Stale => return Err(Rejection::Stale),
            Freshness::NotRecent => return Err(Rejection::NotRecent),
        }

        // Lost a race with a concurrent pass.
        if !self.ctx.store.record(&norm_link) {
            return Err(Rejection::SeenLink);
        }
        self.seen_titles.insert(norm_title.clone());

        Ok(AcceptedItem {
            item: CandidateItem {
                title: title.to_string(),
                link: entry.link,
                published_at,
                source: source.to_string(),
            },
            normalized_link: norm_link,
            normalized_title: norm_title,
        })
    }
}

/// Filter already-fetched entries, source by source, in the given order.
///
/// Returns accepted items sorted newest first; ties keep source order.
pub fn filter_entries(
    ctx: &WatchContext,
    policy: &FreshnessPolicy,
    batches: Vec<(String, RelevanceRule, Vec<RawEntry>)>,
) -> PassOutcome {
    let mut filter = PassFilter::new(ctx, policy);
    let mut out = PassOutcome::default();

    for (source, rule, entries) in batches {
        out.stats.fetched += entries.len();
        for entry in entries {
            match filter.admit(&source, rule, entry) {
                Ok(item) => {
                    tracing::debug!(target: "ingest", source = %source, link = %item.normalized_link, "accepted");
                    out.items.push(item);
                }
                Err(why) => out.stats.reject(why),
            }
        }
    }

    out.stats.accepted = out.items.len();
    out.items
        .sort_by(|a, b| b.item.published_at.cmp(&a.item.published_at));
    out
}

/// Run one collection pass over all providers.
///
/// A provider that fails contributes nothing; the pass carries on with the rest.
pub async fn collect_pass(
    ctx: &WatchContext,
    providers: &[Box<dyn SourceProvider>],
    policy: &FreshnessPolicy,
) -> PassOutcome {
    ensure_metrics_described();

    let mut batches = Vec::with_capacity(providers.len());
    let mut failed = Vec::new();
    for p in providers {
        let t0 = std::time::Instant::now();
        match p.fetch_entries().await {
            Ok(entries) => {
                counter!("ingest_entries_total").increment(entries.len() as u64);
                batches.push((p.label().to_string(), p.rule(), entries));
            }
            Err(e) => {
                tracing::warn!(target: "ingest", error = ?e, source = p.label(), "source fetch failed");
                counter!("ingest_source_errors_total").increment(1);
                failed.push(p.label().to_string());
            }
        }
        histogram!("ingest_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
    }

    let mut outcome = filter_entries(ctx, policy, batches);
    outcome.stats.failed_sources = failed;

    counter!("ingest_accepted_total").increment(outcome.items.len() as u64);
    gauge!("ingest_pass_last_run_ts").set(ctx.clock.now().timestamp() as f64);

    tracing::info!(
        target: "ingest",
        fetched = outcome.stats.fetched,
        accepted = outcome.stats.accepted,
        seen = outcome.stats.seen_link,
        dup_title = outcome.stats.duplicate_title,
        irrelevant = outcome.stats.irrelevant,
        stale = outcome.stats.stale,
        not_recent = outcome.stats.not_recent,
        failed = outcome.stats.failed_sources.len(),
        "collection pass finished"
    );

    outcome
}
