// tests/providers_video_search.rs
use std::sync::Arc;

use chrono::{Duration, FixedOffset, TimeZone, Utc};

use mention_relay::freshness::FreshnessPolicy;
use mention_relay::ingest::providers::video_search::{parse_search_response, VideoSearchProvider};
use mention_relay::ingest::types::SourceProvider;
use mention_relay::relevance::{KeywordMatcher, RelevanceRule};
use mention_relay::{collect_pass, FixedClock, SeenLinkStore, WatchContext};

const VIDEOS: &str = include_str!("fixtures/video_search_videos.json");
const RESULTS: &str = include_str!("fixtures/video_search_results.json");

#[test]
fn videos_shape() {
    let entries = parse_search_response(VIDEOS).unwrap();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[1].title, "Miza paper unboxing haul");
    assert_eq!(
        entries[0].published,
        Some(Utc.with_ymd_and_hms(2025, 10, 1, 4, 58, 0).unwrap())
    );
    assert_eq!(entries[3].published, None);
}

#[test]
fn results_shape_skips_broken_items() {
    let entries = parse_search_response(RESULTS).unwrap();
    assert_eq!(entries.len(), 2);
    // an unreadable createTime keeps the item, undated
    assert_eq!(entries[1].title, "Miza ra mắt sản phẩm mới");
    assert_eq!(entries[1].published, None);
    assert_eq!(entries[0].title, "Miza Việt Nam livestream");
    assert_eq!(
        entries[0].link,
        "https://www.tiktok.com/@mizagroup/video/7550000000000000010"
    );
}

#[test]
fn quota_error_body_is_zero_results() {
    let body = r#"{"message":"You have exceeded the MONTHLY quota"}"#;
    assert!(parse_search_response(body).unwrap().is_empty());
}

#[tokio::test]
async fn script_rule_filters_foreign_clips() {
    let aliases: Vec<String> = ["Miza", "MZG", "Giấy Miza"].iter().map(|s| s.to_string()).collect();
    let ctx = WatchContext::new(
        Arc::new(SeenLinkStore::in_memory()),
        Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2025, 10, 1, 5, 0, 0).unwrap())),
        KeywordMatcher::new(&aliases).unwrap(),
        FixedOffset::east_opt(7 * 3600).unwrap(),
    );
    let providers: Vec<Box<dyn SourceProvider>> = vec![
        Box::new(VideoSearchProvider::from_fixture(
            "TikTok",
            VIDEOS,
            RelevanceRule::KeywordAndScript,
        )),
        Box::new(VideoSearchProvider::from_fixture(
            "TikTok (results)",
            RESULTS,
            RelevanceRule::KeywordAndScript,
        )),
    ];
    let policy = FreshnessPolicy::window(Duration::hours(48)).with_recency(Duration::minutes(5));

    let out = collect_pass(&ctx, &providers, &policy).await;
    let titles: Vec<&str> = out.items.iter().map(|i| i.title()).collect();
    // Undated clips count as published now.
    assert_eq!(
        titles,
        vec![
            "MZG chưa có ngày đăng",
            "Miza ra mắt sản phẩm mới",
            "Giấy Miza tuyển công nhân #miza",
            "Miza Việt Nam livestream",
        ]
    );
    assert_eq!(out.stats.irrelevant, 2);
}
