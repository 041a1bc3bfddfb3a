// src/config/watch.rs
use anyhow::{anyhow, bail, Context, Result};
use chrono::{Duration, FixedOffset, NaiveTime};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::freshness::FreshnessPolicy;
use crate::ingest::normalize::VIETNAMESE_LETTERS;
use crate::relevance::{KeywordMatcher, RelevanceRule};

pub const ENV_WATCH_CONFIG_PATH: &str = "WATCH_CONFIG_PATH";
pub const DEFAULT_WATCH_CONFIG_PATH: &str = "config/watch.toml";

/// Upper bounds keep every derived `Duration` and `now - window` in range.
pub const MAX_WINDOW_HOURS: i64 = 24 * 366 * 10;
pub const MAX_INTERVAL_MINUTES: u64 = 24 * 60;
pub const MAX_DELAY_MINUTES: u64 = 7 * 24 * 60;

fn default_utc_offset_hours() -> i32 {
    7
}
fn default_store_path() -> PathBuf {
    PathBuf::from("data/sent_links.txt")
}
fn default_http_timeout_secs() -> u64 {
    10
}
fn default_true() -> bool {
    true
}
fn default_script_letters() -> String {
    VIETNAMESE_LETTERS.to_string()
}
fn default_script_hosts() -> Vec<String> {
    vec!["youtube.com".to_string()]
}
fn default_interval_minutes() -> u64 {
    5
}
fn default_realtime_window_hours() -> i64 {
    48
}
fn default_digest_at() -> String {
    "09:00".to_string()
}
fn default_digest_window_hours() -> i64 {
    168
}
fn default_digest_max_items() -> usize {
    20
}
fn default_digest_title() -> String {
    "News digest".to_string()
}
fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}
fn default_shortener_endpoint() -> String {
    "https://is.gd/create.php".to_string()
}
fn default_region() -> String {
    "VN".to_string()
}
fn default_count() -> u32 {
    10
}

/// Whole service configuration, loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    #[serde(default)]
    pub general: GeneralCfg,
    pub keywords: KeywordsCfg,
    #[serde(default, rename = "source")]
    pub sources: Vec<SourceCfg>,
    #[serde(default)]
    pub realtime: RealtimeCfg,
    #[serde(default)]
    pub digest: DigestCfg,
    #[serde(default)]
    pub telegram: TelegramCfg,
    #[serde(default)]
    pub shortener: ShortenerCfg,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneralCfg {
    /// Civil timezone as a fixed UTC offset.
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    /// Sent once when the service starts; omitted means no announcement.
    #[serde(default)]
    pub startup_message: Option<String>,
}

impl Default for GeneralCfg {
    fn default() -> Self {
        Self {
            utc_offset_hours: default_utc_offset_hours(),
            store_path: default_store_path(),
            http_timeout_secs: default_http_timeout_secs(),
            startup_message: None,
        }
    }
}

impl GeneralCfg {
    pub fn tz(&self) -> Result<FixedOffset> {
        if !(-12..=14).contains(&self.utc_offset_hours) {
            bail!("utc_offset_hours out of range: {}", self.utc_offset_hours);
        }
        FixedOffset::east_opt(self.utc_offset_hours * 3600)
            .ok_or_else(|| anyhow!("utc_offset_hours out of range: {}", self.utc_offset_hours))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeywordsCfg {
    pub aliases: Vec<String>,
    #[serde(default = "default_script_letters")]
    pub script_letters: String,
    #[serde(default = "default_script_hosts")]
    pub script_hosts: Vec<String>,
}

impl KeywordsCfg {
    pub fn matcher(&self) -> Result<KeywordMatcher> {
        KeywordMatcher::with_script(&self.aliases, &self.script_letters, &self.script_hosts)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Feed,
    VideoSearch,
}

/// One `[[source]]` table. `url` is used by feeds; the video search kind uses
/// `url` as its endpoint plus `query`/`region`/`count`.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceCfg {
    pub label: String,
    pub kind: SourceKind,
    pub url: String,
    #[serde(default)]
    pub rule: RelevanceRule,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_count")]
    pub count: u32,
}

impl SourceCfg {
    pub fn feed(label: &str, url: &str) -> Self {
        Self {
            label: label.to_string(),
            kind: SourceKind::Feed,
            url: url.to_string(),
            rule: RelevanceRule::Keyword,
            query: None,
            region: default_region(),
            count: default_count(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeCfg {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
    #[serde(default = "default_realtime_window_hours")]
    pub window_hours: i64,
    /// Recency gate; absent means pure-window mode.
    #[serde(default)]
    pub recency_minutes: Option<i64>,
    /// Delay between acceptance and delivery; absent means immediate.
    #[serde(default)]
    pub delay_minutes: Option<u64>,
    #[serde(default = "default_true")]
    pub run_on_startup: bool,
}

impl Default for RealtimeCfg {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_minutes: default_interval_minutes(),
            window_hours: default_realtime_window_hours(),
            recency_minutes: None,
            delay_minutes: None,
            run_on_startup: true,
        }
    }
}

impl RealtimeCfg {
    pub fn policy(&self) -> FreshnessPolicy {
        let p = FreshnessPolicy::window(Duration::hours(self.window_hours));
        match self.recency_minutes {
            Some(m) => p.with_recency(Duration::minutes(m)),
            None => p,
        }
    }

    pub fn delay(&self) -> Option<std::time::Duration> {
        self.delay_minutes
            .filter(|m| *m > 0)
            .map(|m| std::time::Duration::from_secs(m * 60))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DigestCfg {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Local wall-clock time, `HH:MM`.
    #[serde(default = "default_digest_at")]
    pub at: String,
    #[serde(default = "default_digest_window_hours")]
    pub window_hours: i64,
    #[serde(default = "default_digest_max_items")]
    pub max_items: usize,
    #[serde(default = "default_digest_title")]
    pub title: String,
    #[serde(default = "default_true")]
    pub run_on_startup: bool,
}

impl Default for DigestCfg {
    fn default() -> Self {
        Self {
            enabled: true,
            at: default_digest_at(),
            window_hours: default_digest_window_hours(),
            max_items: default_digest_max_items(),
            title: default_digest_title(),
            run_on_startup: true,
        }
    }
}

impl DigestCfg {
    pub fn policy(&self) -> FreshnessPolicy {
        FreshnessPolicy::window(Duration::hours(self.window_hours))
    }

    pub fn at_time(&self) -> Result<NaiveTime> {
        NaiveTime::parse_from_str(self.at.trim(), "%H:%M")
            .with_context(|| format!("digest.at must be HH:MM, got {:?}", self.at))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramCfg {
    #[serde(default = "default_telegram_api_base")]
    pub api_base: String,
}

impl Default for TelegramCfg {
    fn default() -> Self {
        Self {
            api_base: default_telegram_api_base(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShortenerCfg {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_shortener_endpoint")]
    pub endpoint: String,
}

impl Default for ShortenerCfg {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_shortener_endpoint(),
        }
    }
}

impl WatchConfig {
    /// Load from an explicit TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading watch config from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing watch config {}", path.display()))
    }

    /// Load using env var + fallbacks:
    /// 1) $WATCH_CONFIG_PATH (must exist)
    /// 2) config/watch.toml
    /// 3) built-in seed
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_WATCH_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                bail!("{ENV_WATCH_CONFIG_PATH} points to non-existent path {}", pb.display());
            }
            return Self::load_from(&pb);
        }
        let default_p = PathBuf::from(DEFAULT_WATCH_CONFIG_PATH);
        if default_p.exists() {
            return Self::load_from(&default_p);
        }
        tracing::info!("no watch config file found, using built-in seed");
        Ok(Self::default_seed())
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: WatchConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        self.general.tz()?;
        if self.general.http_timeout_secs == 0 {
            bail!("general.http_timeout_secs must be positive");
        }
        self.keywords.matcher().context("keywords")?;
        if self.sources.is_empty() {
            bail!("at least one [[source]] is required");
        }
        for s in &self.sources {
            if s.label.trim().is_empty() || s.url.trim().is_empty() {
                bail!("every source needs a label and a url");
            }
            if s.kind == SourceKind::VideoSearch && s.query.as_deref().unwrap_or("").trim().is_empty() {
                bail!("video search source {:?} needs a query", s.label);
            }
        }
        check_window("realtime.window_hours", self.realtime.window_hours)?;
        check_window("digest.window_hours", self.digest.window_hours)?;
        if !(1..=MAX_INTERVAL_MINUTES).contains(&self.realtime.interval_minutes) {
            bail!("realtime.interval_minutes must be in 1..={MAX_INTERVAL_MINUTES}");
        }
        if let Some(m) = self.realtime.recency_minutes {
            let max = MAX_WINDOW_HOURS * 60;
            if !(1..=max).contains(&m) || Duration::try_minutes(m).is_none() {
                bail!("realtime.recency_minutes must be in 1..={max} when set");
            }
        }
        if let Some(m) = self.realtime.delay_minutes {
            if m > MAX_DELAY_MINUTES || m.checked_mul(60).is_none() {
                bail!("realtime.delay_minutes must be at most {MAX_DELAY_MINUTES}");
            }
        }
        self.digest.at_time()?;
        Ok(())
    }

    /// Built-in configuration matching the original deployment: Vietnamese
    /// business news plus YouTube and TikTok, 5-minute realtime gate, 09:00
    /// weekly-window digest.
    pub fn default_seed() -> Self {
        let mut sources = vec![
            SourceCfg::feed(
                "Google News",
                "https://news.google.com/rss/search?q=(Miza+OR+MZG+OR+Gi%E1%BA%A5y+Miza)&hl=vi&gl=VN&ceid=VN:vi",
            ),
            SourceCfg::feed("Bing News", "https://www.bing.com/news/search?q=Miza+MZG&format=rss"),
            SourceCfg::feed(
                "YouTube Channel",
                "https://www.youtube.com/feeds/videos.xml?channel_id=UCd2aU53aTTxxLONczZc34BA",
            ),
            SourceCfg::feed("VNExpress", "https://vnexpress.net/rss/doanh-nghiep.rss"),
            SourceCfg::feed("Cafef", "https://cafef.vn/rss/tai-chinh-doanh-nghiep.rss"),
            SourceCfg::feed("VietnamBiz", "https://vietnambiz.vn/kinh-doanh.rss"),
        ];
        sources.push(SourceCfg {
            label: "TikTok".to_string(),
            kind: SourceKind::VideoSearch,
            url: "https://tiktok-scraper7.p.rapidapi.com/feed/search".to_string(),
            rule: RelevanceRule::KeywordAndScript,
            query: Some("Miza MZG Giấy Miza Việt Nam".to_string()),
            region: default_region(),
            count: default_count(),
        });

        Self {
            general: GeneralCfg {
                startup_message: Some("🚀 Miza news relay started".to_string()),
                ..GeneralCfg::default()
            },
            keywords: KeywordsCfg {
                aliases: vec!["Miza".into(), "MZG".into(), "Giấy Miza".into()],
                script_letters: default_script_letters(),
                script_hosts: default_script_hosts(),
            },
            sources,
            realtime: RealtimeCfg {
                recency_minutes: Some(5),
                ..RealtimeCfg::default()
            },
            digest: DigestCfg {
                title: "Miza news digest".to_string(),
                ..DigestCfg::default()
            },
            telegram: TelegramCfg::default(),
            shortener: ShortenerCfg::default(),
        }
    }
}

fn check_window(field: &str, hours: i64) -> Result<()> {
    if !(1..=MAX_WINDOW_HOURS).contains(&hours) || Duration::try_hours(hours).is_none() {
        bail!("{field} must be in 1..={MAX_WINDOW_HOURS}, got {hours}");
    }
    Ok(())
}
