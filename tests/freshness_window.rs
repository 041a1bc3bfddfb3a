// tests/freshness_window.rs
use chrono::{Duration, FixedOffset, TimeZone, Utc};
use mention_relay::freshness::{
    from_epoch_secs, is_recent, localize, parse_feed_timestamp, within_window, Freshness,
    FreshnessPolicy,
};

fn tz() -> FixedOffset {
    FixedOffset::east_opt(7 * 3600).unwrap()
}

#[test]
fn window_48h() {
    let now = tz().with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap();
    let w = Duration::hours(48);
    assert!(!within_window(now - Duration::hours(49), now, w));
    assert!(within_window(now - Duration::hours(47), now, w));
}

#[test]
fn recency_5_minutes() {
    let now = tz().with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap();
    let t = Duration::minutes(5);
    assert!(is_recent(now - Duration::minutes(4), now, t));
    assert!(!is_recent(now - Duration::minutes(6), now, t));
    assert!(is_recent(now + Duration::minutes(30), now, t));
}

#[test]
fn policy_distinguishes_stale_from_not_recent() {
    let now = tz().with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap();
    let gated = FreshnessPolicy::window(Duration::hours(48)).with_recency(Duration::minutes(5));
    assert_eq!(gated.check(now - Duration::minutes(1), now), Freshness::Fresh);
    assert_eq!(gated.check(now - Duration::hours(2), now), Freshness::NotRecent);
    assert_eq!(gated.check(now - Duration::hours(50), now), Freshness::Stale);

    let pure = FreshnessPolicy::window(Duration::hours(48));
    assert_eq!(pure.check(now - Duration::hours(2), now), Freshness::Fresh);
}

#[test]
fn feed_timestamps_in_common_shapes() {
    let expected = Utc.with_ymd_and_hms(2025, 10, 1, 4, 58, 0).unwrap();
    assert_eq!(parse_feed_timestamp("Wed, 01 Oct 2025 11:58:00 +0700"), Some(expected));
    assert_eq!(parse_feed_timestamp("Wed, 01 Oct 2025 04:58:00 GMT"), Some(expected));
    assert_eq!(parse_feed_timestamp("2025-10-01T04:58:00+00:00"), Some(expected));
    assert_eq!(parse_feed_timestamp("2025-10-01T11:58:00+07:00"), Some(expected));
    assert_eq!(parse_feed_timestamp("yesterday"), None);
    assert_eq!(parse_feed_timestamp("   "), None);
}

#[test]
fn missing_stamps_fall_back_to_now() {
    let now = Utc.with_ymd_and_hms(2025, 10, 1, 5, 0, 0).unwrap();
    assert_eq!(from_epoch_secs(Some(0)), None);
    assert_eq!(from_epoch_secs(None), None);
    assert_eq!(from_epoch_secs(Some(1_759_294_800)), Some(now));
    let local = localize(None, now, tz());
    assert_eq!(local, now.with_timezone(&tz()));
    assert_eq!(local.format("%H:%M").to_string(), "12:00");
}
