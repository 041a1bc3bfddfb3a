// src/context.rs
//! Explicit state threaded through collection passes and jobs.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, FixedOffset, Utc};

use crate::ingest::store::SeenLinkStore;
use crate::relevance::KeywordMatcher;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().expect("clock mutex poisoned") = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().expect("clock mutex poisoned");
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock mutex poisoned")
    }
}

#[derive(Clone)]
pub struct WatchContext {
    pub store: Arc<SeenLinkStore>,
    pub clock: Arc<dyn Clock>,
    pub keywords: Arc<KeywordMatcher>,
    pub tz: FixedOffset,
}

impl WatchContext {
    pub fn new(
        store: Arc<SeenLinkStore>,
        clock: Arc<dyn Clock>,
        keywords: KeywordMatcher,
        tz: FixedOffset,
    ) -> Self {
        Self {
            store,
            clock,
            keywords: Arc::new(keywords),
            tz,
        }
    }

    /// Current time in the configured civil timezone.
    pub fn now_local(&self) -> DateTime<FixedOffset> {
        self.clock.now().with_timezone(&self.tz)
    }
}
