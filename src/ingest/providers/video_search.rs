// src/ingest/providers/video_search.rs
//! Keyed short-video search API (RapidAPI-hosted TikTok scraper shape).
//!
//! The response is `{"data": {"videos": [...]}}` or `{"data": {"results": [...]}}`.
//! Anything else is an empty result, not an error.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::freshness::from_epoch_secs;
use crate::ingest::normalize::clean_text;
use crate::ingest::types::{RawEntry, SourceProvider};
use crate::relevance::RelevanceRule;

#[derive(Debug, Default, Deserialize)]
struct VideoItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    desc: Option<String>,
    #[serde(rename = "webVideoUrl", alias = "web_video_url", default)]
    web_video_url: Option<String>,
    /// Integer, float or numeric string depending on the scraper; anything
    /// else is treated as missing.
    #[serde(rename = "createTime", alias = "create_time", default)]
    create_time: Option<Value>,
}

impl VideoItem {
    fn into_entry(self) -> RawEntry {
        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .or(self.desc)
            .unwrap_or_default();
        RawEntry {
            title: clean_text(&title),
            link: self.web_video_url.unwrap_or_default().trim().to_string(),
            published: from_epoch_secs(self.create_time.as_ref().and_then(epoch_secs)),
        }
    }
}

fn epoch_secs(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(float_secs)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(float_secs))
        }
        _ => None,
    }
}

fn float_secs(f: f64) -> Option<i64> {
    (f.is_finite() && f.abs() < i64::MAX as f64).then(|| f.trunc() as i64)
}

/// Parse a search response body. Only a non-JSON body is an error.
pub fn parse_search_response(body: &str) -> Result<Vec<RawEntry>> {
    let v: Value = serde_json::from_str(body).context("video search body is not JSON")?;
    let list = v
        .get("data")
        .and_then(|d| {
            d.get("videos")
                .and_then(Value::as_array)
                .or_else(|| d.get("results").and_then(Value::as_array))
        });
    let Some(list) = list else {
        tracing::debug!(target: "ingest", "video search response has no data.videos/results");
        return Ok(Vec::new());
    };
    Ok(list
        .iter()
        .filter_map(|raw| serde_json::from_value::<VideoItem>(raw.clone()).ok())
        .map(VideoItem::into_entry)
        .collect())
}

#[derive(Debug, Clone)]
pub struct VideoSearchQuery {
    pub keywords: String,
    pub region: String,
    pub count: u32,
}

pub struct VideoSearchProvider {
    label: String,
    rule: RelevanceRule,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        client: reqwest::Client,
        endpoint: String,
        api_key: String,
        query: VideoSearchQuery,
    },
}

impl VideoSearchProvider {
    pub fn from_endpoint(
        label: impl Into<String>,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        query: VideoSearchQuery,
        client: reqwest::Client,
        rule: RelevanceRule,
    ) -> Self {
        Self {
            label: label.into(),
            rule,
            mode: Mode::Http {
                client,
                endpoint: endpoint.into(),
                api_key: api_key.into(),
                query,
            },
        }
    }

    pub fn from_fixture(label: impl Into<String>, json: &str, rule: RelevanceRule) -> Self {
        Self {
            label: label.into(),
            rule,
            mode: Mode::Fixture(json.to_string()),
        }
    }
}

#[async_trait]
impl SourceProvider for VideoSearchProvider {
    async fn fetch_entries(&self) -> Result<Vec<RawEntry>> {
        match &self.mode {
            Mode::Fixture(s) => parse_search_response(s),
            Mode::Http {
                client,
                endpoint,
                api_key,
                query,
            } => {
                let host = reqwest::Url::parse(endpoint)
                    .ok()
                    .and_then(|u| u.host_str().map(str::to_string))
                    .ok_or_else(|| anyhow!("video search endpoint has no host: {endpoint}"))?;
                let count = query.count.to_string();
                let body = client
                    .get(endpoint)
                    .header("X-RapidAPI-Key", api_key)
                    .header("X-RapidAPI-Host", host)
                    .query(&[
                        ("keywords", query.keywords.as_str()),
                        ("region", query.region.as_str()),
                        ("count", count.as_str()),
                    ])
                    .send()
                    .await
                    .context("video search request")?
                    .text()
                    .await
                    .context("reading video search body")?;
                parse_search_response(&body)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_shape_and_desc_fallback() {
        let body = r#"{"data":{"results":[
            {"title":"","desc":"Giấy Miza livestream","web_video_url":"https://t/v/1","create_time":1759294800}
        ]}}"#;
        let entries = parse_search_response(body).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Giấy Miza livestream");
        assert_eq!(entries[0].link, "https://t/v/1");
        assert!(entries[0].published.is_some());
    }

    #[test]
    fn odd_create_time_falls_back_instead_of_dropping() {
        let body = r#"{"data":{"videos":[
            {"title":"int","webVideoUrl":"https://t/v/1","createTime":1759294800},
            {"title":"string","webVideoUrl":"https://t/v/2","createTime":"1759294800"},
            {"title":"float","webVideoUrl":"https://t/v/3","createTime":1759294800.0},
            {"title":"junk","webVideoUrl":"https://t/v/4","createTime":"yesterday"},
            {"title":"null","webVideoUrl":"https://t/v/5","createTime":null}
        ]}}"#;
        let entries = parse_search_response(body).unwrap();
        assert_eq!(entries.len(), 5);
        let expected = from_epoch_secs(Some(1759294800));
        assert!(expected.is_some());
        for e in &entries[..3] {
            assert_eq!(e.published, expected, "{}", e.title);
        }
        assert_eq!(entries[3].published, None);
        assert_eq!(entries[4].published, None);
    }

    #[test]
    fn non_object_items_are_skipped() {
        let body = r#"{"data":{"videos":[
            {"title":"ok","webVideoUrl":"https://t/v/2","createTime":1759294800},
            "not an object",
            42
        ]}}"#;
        let entries = parse_search_response(body).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].link, "https://t/v/2");
    }

    #[test]
    fn null_videos_does_not_hide_results() {
        let body = r#"{"data":{"videos":null,"results":[
            {"title":"from results","web_video_url":"https://t/v/9","create_time":1759294800}
        ]}}"#;
        let entries = parse_search_response(body).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].link, "https://t/v/9");
    }

    #[test]
    fn unexpected_shape_is_empty_not_error() {
        assert!(parse_search_response(r#"{"code":-1,"msg":"quota"}"#).unwrap().is_empty());
        assert!(parse_search_response(r#"{"data":null}"#).unwrap().is_empty());
        assert!(parse_search_response("<html>").is_err());
    }
}
