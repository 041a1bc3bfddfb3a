// src/ingest/providers/feed.rs
//! RSS 2.0 / Atom feed provider.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use quick_xml::de::from_str;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use serde::Deserialize;

use crate::freshness::resolve_published;
use crate::ingest::normalize::clean_text;
use crate::ingest::types::{RawEntry, SourceProvider};
use crate::relevance::RelevanceRule;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    #[serde(rename = "dc:date")]
    dc_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entry: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<AtomText>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    published: Option<String>,
    updated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomText {
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href", default)]
    href: String,
    #[serde(rename = "@rel", default)]
    rel: Option<String>,
}

impl AtomEntry {
    /// `rel="alternate"` (or no rel, which means alternate), else the first link.
    fn alternate_href(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
            .or_else(|| self.links.first())
            .map(|l| l.href.as_str())
    }
}

/// Parse an RSS or Atom document into raw entries, dispatching on the root
/// element.
pub fn parse_feed(xml: &str) -> Result<Vec<RawEntry>> {
    let xml_clean = scrub_html_entities_for_xml(xml);

    match root_element(&xml_clean)?.as_str() {
        "rss" => {
            let rss: Rss = from_str(&xml_clean).context("parsing rss xml")?;
            Ok(rss
                .channel
                .item
                .into_iter()
                .map(|it| RawEntry {
                    title: clean_text(it.title.as_deref().unwrap_or_default()),
                    link: it.link.unwrap_or_default().trim().to_string(),
                    published: resolve_published(it.pub_date.as_deref(), it.dc_date.as_deref()),
                })
                .collect())
        }
        "feed" => {
            let atom: AtomFeed = from_str(&xml_clean).context("parsing atom xml")?;
            Ok(atom
                .entry
                .into_iter()
                .map(|e| RawEntry {
                    title: clean_text(e.title.as_ref().map(|t| t.value.as_str()).unwrap_or_default()),
                    link: e.alternate_href().unwrap_or_default().trim().to_string(),
                    published: resolve_published(e.published.as_deref(), e.updated.as_deref()),
                })
                .collect())
        }
        other => bail!("unsupported feed root <{other}>"),
    }
}

fn root_element(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Ok(String::from_utf8_lossy(e.local_name().as_ref()).into_owned())
            }
            Ok(Event::Eof) => bail!("empty feed document"),
            Err(e) => return Err(anyhow!("feed xml error: {e}")),
            _ => {}
        }
    }
}

pub struct FeedProvider {
    label: String,
    rule: RelevanceRule,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl FeedProvider {
    pub fn from_url(
        label: impl Into<String>,
        url: impl Into<String>,
        client: reqwest::Client,
        rule: RelevanceRule,
    ) -> Self {
        Self {
            label: label.into(),
            rule,
            mode: Mode::Http {
                url: url.into(),
                client,
            },
        }
    }

    /// Serve a stored document instead of fetching (tests, dry runs).
    pub fn from_fixture(label: impl Into<String>, xml: &str, rule: RelevanceRule) -> Self {
        Self {
            label: label.into(),
            rule,
            mode: Mode::Fixture(xml.to_string()),
        }
    }
}

#[async_trait]
impl SourceProvider for FeedProvider {
    async fn fetch_entries(&self) -> Result<Vec<RawEntry>> {
        match &self.mode {
            Mode::Fixture(s) => parse_feed(s),
            Mode::Http { url, client } => {
                let body = client
                    .get(url)
                    .send()
                    .await
                    .with_context(|| format!("GET {url}"))?
                    .error_for_status()
                    .with_context(|| format!("feed {url} returned non-2xx"))?
                    .text()
                    .await
                    .context("reading feed body")?;
                parse_feed(&body).with_context(|| format!("parsing feed {url}"))
            }
        }
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn rule(&self) -> RelevanceRule {
        self.rule
    }
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
