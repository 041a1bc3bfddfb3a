// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

use crate::relevance::RelevanceRule;

/// One entry as a provider hands it over, before timestamp localization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub title: String,
    pub link: String,
    /// `None` when the source had no usable timestamp; resolved to "now" later.
    pub published: Option<DateTime<Utc>>,
}

impl RawEntry {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        published: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            published,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateItem {
    pub title: String,
    pub link: String, // raw, pre-normalization
    pub published_at: DateTime<FixedOffset>,
    pub source: String, // configured source label
}

/// A candidate that passed dedup, keyword and freshness checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcceptedItem {
    pub item: CandidateItem,
    pub normalized_link: String,
    pub normalized_title: String,
}

impl AcceptedItem {
    pub fn title(&self) -> &str {
        &self.item.title
    }

    /// The canonical link; this is what gets announced and persisted.
    pub fn link(&self) -> &str {
        &self.normalized_link
    }

    pub fn source(&self) -> &str {
        &self.item.source
    }

    pub fn published_at(&self) -> DateTime<FixedOffset> {
        self.item.published_at
    }
}

#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_entries(&self) -> Result<Vec<RawEntry>>;
    fn label(&self) -> &str;
    fn rule(&self) -> RelevanceRule;
}
