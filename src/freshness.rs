//! # Freshness
//! Age checks for candidate items, plus timestamp derivation.
//!
//! A pass always applies a window (`published_at >= now - window`). Realtime
//! passes may add a recency gate (`now - published_at <= threshold`) so that
//! items which are merely new to the seen-link store, but old in reality, are
//! not announced as breaking news after a cold start.

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::OffsetDateTime;

/// Accept iff `published_at >= now - window`.
pub fn within_window(
    published_at: DateTime<FixedOffset>,
    now: DateTime<FixedOffset>,
    window: Duration,
) -> bool {
    published_at >= now - window
}

/// Accept iff the item is at most `threshold` old. Items dated in the future
/// count as recent.
pub fn is_recent(
    published_at: DateTime<FixedOffset>,
    now: DateTime<FixedOffset>,
    threshold: Duration,
) -> bool {
    now.signed_duration_since(published_at) <= threshold
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    /// Older than the window.
    Stale,
    /// Inside the window but fails the recency gate.
    NotRecent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    pub window: Duration,
    pub recency: Option<Duration>,
}

impl FreshnessPolicy {
    pub fn window(window: Duration) -> Self {
        Self {
            window,
            recency: None,
        }
    }

    pub fn with_recency(mut self, threshold: Duration) -> Self {
        self.recency = Some(threshold);
        self
    }

    pub fn check(
        &self,
        published_at: DateTime<FixedOffset>,
        now: DateTime<FixedOffset>,
    ) -> Freshness {
        if !within_window(published_at, now, self.window) {
            return Freshness::Stale;
        }
        match self.recency {
            Some(threshold) if !is_recent(published_at, now, threshold) => Freshness::NotRecent,
            _ => Freshness::Fresh,
        }
    }
}

/// Parse a feed timestamp: RFC 2822 (RSS) or RFC 3339 (Atom).
pub fn parse_feed_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    let ts = ts.trim();
    if ts.is_empty() {
        return None;
    }
    if let Some(dt) = OffsetDateTime::parse(ts, &Rfc2822)
        .or_else(|_| OffsetDateTime::parse(ts, &Rfc3339))
        .ok()
        .and_then(offset_to_utc)
    {
        return Some(dt);
    }
    // chrono is more lenient with obsolete zone names ("GMT", "EST").
    DateTime::parse_from_rfc2822(ts)
        .or_else(|_| DateTime::parse_from_rfc3339(ts))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn offset_to_utc(dt: OffsetDateTime) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(dt.unix_timestamp(), dt.nanosecond())
}

/// Publication timestamp, else update timestamp, else `None`.
pub fn resolve_published(published: Option<&str>, updated: Option<&str>) -> Option<DateTime<Utc>> {
    published
        .and_then(parse_feed_timestamp)
        .or_else(|| updated.and_then(parse_feed_timestamp))
}

/// Epoch seconds from a search API; zero and negative values count as missing.
pub fn from_epoch_secs(secs: Option<i64>) -> Option<DateTime<Utc>> {
    secs.filter(|s| *s > 0)
        .and_then(|s| Utc.timestamp_opt(s, 0).single())
}

/// Resolve to the civil timezone, falling back to `now` for missing stamps.
pub fn localize(
    published: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    tz: FixedOffset,
) -> DateTime<FixedOffset> {
    published.unwrap_or(now).with_timezone(&tz)
}
