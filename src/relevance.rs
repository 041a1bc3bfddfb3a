// src/relevance.rs
//! Relevance gate: does an entry talk about the tracked entity?
//!
//! Two signals, both case-insensitive:
//! - keyword: a word-boundary alternation over the entity's name and aliases;
//! - script: at least one letter of the target language's accented set, used
//!   for noisy sources (open video search) that surface foreign content.

use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::Deserialize;

use crate::ingest::normalize::VIETNAMESE_LETTERS;

/// Which checks a source's entries must pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelevanceRule {
    /// Keyword match only.
    #[default]
    Keyword,
    /// Keyword match AND a script signal.
    KeywordAndScript,
}

#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    keyword_re: Regex,
    script_re: Regex,
    script_hosts: Vec<String>,
}

impl KeywordMatcher {
    /// Build a matcher over `aliases` (plain text, not regex).
    pub fn new(aliases: &[String]) -> Result<Self> {
        Self::with_script(aliases, VIETNAMESE_LETTERS, &[])
    }

    /// Build with an explicit script letter set and the hosts whose links
    /// always need the script signal.
    pub fn with_script(
        aliases: &[String],
        script_letters: &str,
        script_hosts: &[String],
    ) -> Result<Self> {
        let alternation = aliases
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .map(regex::escape)
            .collect::<Vec<_>>();
        if alternation.is_empty() {
            bail!("keyword matcher needs at least one non-empty alias");
        }
        let keyword_re = Regex::new(&format!(r"(?i)\b(?:{})\b", alternation.join("|")))
            .context("compiling keyword alternation")?;

        let letters: String = script_letters
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| regex::escape(&c.to_string()))
            .collect();
        if letters.is_empty() {
            bail!("script letter set must not be empty");
        }
        let script_re =
            Regex::new(&format!("(?i)[{letters}]")).context("compiling script letter class")?;

        Ok(Self {
            keyword_re,
            script_re,
            script_hosts: script_hosts
                .iter()
                .map(|h| h.trim().to_ascii_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
        })
    }

    pub fn is_relevant(&self, text: &str) -> bool {
        self.keyword_re.is_match(text)
    }

    pub fn has_script_signal(&self, text: &str) -> bool {
        self.script_re.is_match(text)
    }

    fn link_needs_script(&self, link: &str) -> bool {
        let lower = link.to_ascii_lowercase();
        self.script_hosts.iter().any(|h| lower.contains(h.as_str()))
    }

    /// Full gate for one entry of a source configured with `rule`.
    pub fn accepts(&self, rule: RelevanceRule, title: &str, link: &str) -> bool {
        if !self.is_relevant(title) {
            return false;
        }
        let needs_script = rule == RelevanceRule::KeywordAndScript || self.link_needs_script(link);
        !needs_script || self.has_script_signal(title)
    }
}
