// src/ingest/normalize.rs
//! Canonical forms used for deduplication.
//!
//! Links are canonicalized by dropping `utm_*` tracking parameters; this is the
//! form written to the seen-link store. Titles are folded into a comparison key
//! (lowercase, allow-listed letters only, single spaces) that never leaves the
//! current pass.

use once_cell::sync::OnceCell;
use regex::Regex;

/// Vietnamese letters outside ASCII, lowercase.
pub const VIETNAMESE_LETTERS: &str =
    "áàảãạăắằẳẵặâấầẩẫậéèẻẽẹêếềểễệíìỉĩịóòỏõọôốồổỗộơớờởỡợúùủũụưứừửữựýỳỷỹỵđ";

const TITLE_MAX_CHARS: usize = 500;

/// Display cleanup for titles coming out of feeds: entity decode, tag strip,
/// typographic quotes to ASCII, whitespace collapse.
pub fn clean_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    if out.chars().count() > TITLE_MAX_CHARS {
        out = out.chars().take(TITLE_MAX_CHARS).collect();
    }
    out
}

/// Strip `utm_*` query parameters and surrounding whitespace.
///
/// Parameters are recognized after the first `?` and also when they were glued
/// onto the path with `&` and no `?` at all. Whitespace around each part is
/// dropped. The order of remaining parameters and the fragment are kept.
pub fn normalize_link(raw: &str) -> String {
    let trimmed = raw.trim();
    let (body, fragment) = match trimmed.find('#') {
        Some(i) => trimmed.split_at(i),
        None => (trimmed, ""),
    };
    let (path, query) = match body.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (body, None),
    };

    let mut path_parts = path.split('&').map(str::trim);
    let mut out = String::with_capacity(trimmed.len());
    out.push_str(path_parts.next().unwrap_or_default());
    for part in path_parts.filter(|p| !is_tracking_param(p)) {
        out.push('&');
        out.push_str(part);
    }

    if let Some(q) = query {
        let kept: Vec<&str> = q
            .split('&')
            .map(str::trim)
            .filter(|p| !is_tracking_param(p))
            .collect();
        if !kept.is_empty() {
            out.push('?');
            out.push_str(&kept.join("&"));
        }
    }

    out.push_str(fragment);
    out.trim().to_string()
}

fn is_tracking_param(param: &str) -> bool {
    let key = param.split('=').next().unwrap_or_default();
    key.get(..4)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("utm_"))
}

/// Comparison key for same-story detection.
pub fn normalize_title(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_space = false;
    for ch in lowered.chars() {
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if is_title_char(ch) {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch);
        }
    }
    out
}

fn is_title_char(ch: char) -> bool {
    ch.is_ascii_lowercase() || ch.is_ascii_digit() || VIETNAMESE_LETTERS.contains(ch)
}
