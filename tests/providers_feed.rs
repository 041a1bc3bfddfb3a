// tests/providers_feed.rs
use std::sync::Arc;

use chrono::{Duration, FixedOffset, TimeZone, Utc};

use mention_relay::freshness::FreshnessPolicy;
use mention_relay::ingest::providers::feed::{parse_feed, FeedProvider};
use mention_relay::ingest::types::SourceProvider;
use mention_relay::relevance::{KeywordMatcher, RelevanceRule};
use mention_relay::{collect_pass, FixedClock, SeenLinkStore, WatchContext};

const RSS: &str = include_str!("fixtures/news_rss.xml");
const ATOM: &str = include_str!("fixtures/youtube_atom.xml");

fn ctx() -> WatchContext {
    let aliases: Vec<String> = ["Miza", "MZG", "Giấy Miza"].iter().map(|s| s.to_string()).collect();
    WatchContext::new(
        Arc::new(SeenLinkStore::in_memory()),
        Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2025, 10, 1, 5, 0, 0).unwrap())),
        KeywordMatcher::with_script(
            &aliases,
            mention_relay::ingest::normalize::VIETNAMESE_LETTERS,
            &["youtube.com".to_string()],
        )
        .unwrap(),
        FixedOffset::east_opt(7 * 3600).unwrap(),
    )
}

#[test]
fn rss_fixture_parses_all_items() {
    let entries = parse_feed(RSS).unwrap();
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[0].title, "Giấy Miza khánh thành nhà máy mới tại Bắc Ninh");
    assert_eq!(
        entries[0].link,
        "https://vnexpress.net/giay-miza-khanh-thanh-nha-may-4801.html?utm_source=rss&utm_medium=feed"
    );
    assert_eq!(
        entries[0].published,
        Some(Utc.with_ymd_and_hms(2025, 10, 1, 4, 58, 0).unwrap())
    );
    assert_eq!(entries[2].title, "Thị trường giấy bao bì hồi phục");
    // dc:date is used when pubDate is absent.
    assert_eq!(
        entries[4].published,
        Some(Utc.with_ymd_and_hms(2025, 10, 1, 4, 59, 0).unwrap())
    );
}

#[test]
fn atom_fixture_uses_alternate_link_and_published_then_updated() {
    let entries = parse_feed(ATOM).unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].link, "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    assert_eq!(
        entries[0].published,
        Some(Utc.with_ymd_and_hms(2025, 10, 1, 4, 57, 0).unwrap())
    );
    assert_eq!(entries[2].link, "https://www.youtube.com/watch?v=bbbbbbbbbbb");
    assert_eq!(
        entries[2].published,
        Some(Utc.with_ymd_and_hms(2025, 9, 30, 1, 0, 0).unwrap())
    );
}

#[test]
fn non_feed_documents_are_errors() {
    assert!(parse_feed("").is_err());
    assert!(parse_feed("<!DOCTYPE html><html><body>429</body></html>").is_err());
    assert!(parse_feed("<rss><channel><item><title>unterminated").is_err());
}

#[tokio::test]
async fn realtime_pass_over_fixtures() {
    let ctx = ctx();
    let providers: Vec<Box<dyn SourceProvider>> = vec![
        Box::new(FeedProvider::from_fixture("VNExpress", RSS, RelevanceRule::Keyword)),
        Box::new(FeedProvider::from_fixture("YouTube Channel", ATOM, RelevanceRule::Keyword)),
    ];
    let policy = FreshnessPolicy::window(Duration::hours(48)).with_recency(Duration::minutes(5));

    let out = collect_pass(&ctx, &providers, &policy).await;
    let links: Vec<&str> = out.items.iter().map(|i| i.link()).collect();
    assert_eq!(
        links,
        vec![
            "https://vnexpress.net/miza-dai-hoi-4804.html",
            "https://vnexpress.net/giay-miza-khanh-thanh-nha-may-4801.html",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
        ]
    );
    assert_eq!(out.stats.fetched, 8);
    assert_eq!(out.stats.stale, 1);
    // MZG results (2h old) and the Sept 30 video.
    assert_eq!(out.stats.not_recent, 2);
    // Packaging market story and the English-only YouTube title.
    assert_eq!(out.stats.irrelevant, 2);
}

#[tokio::test]
async fn digest_window_admits_the_week() {
    let ctx = ctx();
    let providers: Vec<Box<dyn SourceProvider>> = vec![Box::new(FeedProvider::from_fixture(
        "VNExpress",
        RSS,
        RelevanceRule::Keyword,
    ))];
    let out = collect_pass(&ctx, &providers, &FreshnessPolicy::window(Duration::hours(168))).await;
    assert_eq!(out.items.len(), 4);
    assert_eq!(
        out.items.last().map(|i| i.title()),
        Some("Miza chia cổ tức năm 2024")
    );
}
