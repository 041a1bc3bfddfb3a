// src/notify/format.rs
//! Telegram HTML bodies for realtime announcements and digests.

use chrono::{DateTime, FixedOffset};
use html_escape::encode_text;
use once_cell::sync::Lazy;
use regex::Regex;

use super::telegram::MESSAGE_LIMIT;
use super::OutgoingMessage;
use crate::ingest::types::AcceptedItem;

static YT_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:v=|/)([0-9A-Za-z_-]{11})(?:[^0-9A-Za-z_-]|$)").unwrap()
});

/// Preview image for YouTube links, `None` for everything else.
pub fn youtube_thumbnail(link: &str) -> Option<String> {
    let lower = link.to_ascii_lowercase();
    if !(lower.contains("youtube.com") || lower.contains("youtu.be")) {
        return None;
    }
    YT_ID_RE
        .captures(link)
        .and_then(|c| c.get(1))
        .map(|m| format!("https://img.youtube.com/vi/{}/hqdefault.jpg", m.as_str()))
}

/// `link` is what gets printed (possibly shortened); the preview image is
/// derived from the item's own link.
pub fn realtime_message(item: &AcceptedItem, link: &str) -> OutgoingMessage {
    let body = format!(
        "🆕 <b>{}</b>\n🗓️ {}\n({})\n🔗 {}",
        encode_text(item.title()),
        item.published_at().format("%H:%M %d/%m/%Y"),
        encode_text(item.source()),
        encode_text(link)
    );
    OutgoingMessage::text(body).with_image(youtube_thumbnail(item.link()))
}

fn digest_entry(index: usize, item: &AcceptedItem, link: &str) -> String {
    format!(
        "{}. <b>{}</b> ({})\n🗓️ {}\n🔗 {}",
        index,
        encode_text(item.title()),
        encode_text(item.source()),
        item.published_at().format("%d/%m %H:%M"),
        encode_text(link)
    )
}

pub fn digest_header(title: &str, now: DateTime<FixedOffset>) -> String {
    format!("📢 <b>{} - {}</b>", encode_text(title), now.format("%d/%m"))
}

/// Digest bodies, each within Telegram's message limit. Entries are never
/// split across messages; the header leads the first one.
///
/// `entries` pairs each item with the link to print.
pub fn digest_messages(
    title: &str,
    now: DateTime<FixedOffset>,
    window_hours: i64,
    entries: &[(AcceptedItem, String)],
) -> Vec<OutgoingMessage> {
    let header = digest_header(title, now);
    if entries.is_empty() {
        let days = (window_hours + 23) / 24;
        return vec![OutgoingMessage::text(format!(
            "{header}\n\nNo new items in the last {days} days."
        ))];
    }

    let blocks = entries
        .iter()
        .enumerate()
        .map(|(i, (item, link))| digest_entry(i + 1, item, link));
    chunk_blocks(&header, blocks, MESSAGE_LIMIT)
        .into_iter()
        .map(OutgoingMessage::text)
        .collect()
}

fn chunk_blocks(
    header: &str,
    blocks: impl Iterator<Item = String>,
    limit: usize,
) -> Vec<String> {
    const SEP: &str = "\n\n";
    let mut out = Vec::new();
    let mut cur = header.to_string();
    let mut cur_len = cur.chars().count();

    for block in blocks {
        let block = truncate_chars(&block, limit);
        let block_len = block.chars().count();
        if cur_len > 0 && cur_len + SEP.len() + block_len > limit {
            out.push(std::mem::take(&mut cur));
            cur_len = 0;
        }
        if cur_len > 0 {
            cur.push_str(SEP);
            cur_len += SEP.len();
        }
        cur.push_str(&block);
        cur_len += block_len;
    }
    if !cur.is_empty() {
        out.push(cur);
    }
    out
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
