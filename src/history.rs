//! history.rs: in-memory record of recent passes for the debug endpoint.

use std::sync::Mutex;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::ingest::PassStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Realtime,
    Digest,
}

#[derive(Debug, Clone, Serialize)]
pub struct PassSummary {
    pub job: JobKind,
    pub finished_at: DateTime<FixedOffset>,
    pub stats: PassStats,
    pub delivered: usize,
    pub failed_deliveries: usize,
}

#[derive(Debug)]
pub struct PassHistory {
    inner: Mutex<Vec<PassSummary>>,
    cap: usize,
}

impl PassHistory {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.clamp(1, 10_000);
        Self {
            inner: Mutex::new(Vec::with_capacity(cap)),
            cap,
        }
    }

    pub fn push(&self, entry: PassSummary) {
        let mut v = self.inner.lock().expect("history mutex poisoned");
        v.push(entry);
        if v.len() > self.cap {
            let excess = v.len() - self.cap;
            v.drain(0..excess);
        }
    }

    /// Oldest first.
    pub fn snapshot_last_n(&self, n: usize) -> Vec<PassSummary> {
        let v = self.inner.lock().expect("history mutex poisoned");
        let start = v.len().saturating_sub(n);
        v[start..].to_vec()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("history mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn summary(minute: u32) -> PassSummary {
        let tz = FixedOffset::east_opt(7 * 3600).unwrap();
        PassSummary {
            job: JobKind::Realtime,
            finished_at: tz.with_ymd_and_hms(2025, 10, 1, 9, minute, 0).unwrap(),
            stats: PassStats::default(),
            delivered: 0,
            failed_deliveries: 0,
        }
    }

    #[test]
    fn oldest_entries_are_dropped() {
        let h = PassHistory::with_capacity(3);
        for m in 0..5 {
            h.push(summary(m));
        }
        assert_eq!(h.len(), 3);
        let last = h.snapshot_last_n(2);
        assert_eq!(last.len(), 2);
        assert_eq!(last[1].finished_at, summary(4).finished_at);
        assert_eq!(last[0].finished_at, summary(3).finished_at);
    }
}
