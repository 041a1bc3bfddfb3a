// tests/normalize.rs
use mention_relay::ingest::normalize::{clean_text, normalize_link, normalize_title, VIETNAMESE_LETTERS};

#[test]
fn normalize_link_is_idempotent() {
    let samples = [
        "https://a/1?utm_source=z",
        " https://x/a&utm_source=y ",
        "https://x/a?b=2&utm_medium=rss&a=1#frag",
        "https://x/a&keep=1&UTM_CAMPAIGN=q?utm_term=t&z=9",
        "https://plain.example/path",
        "",
        "https://x/a &utm_source=y",
        "https://x/a ?utm_source=y",
        "https://x/a?b=1 &utm_x=2 #frag",
        "https://x/a?b=1& utm_x=2",
        "https://x/a &#f",
        "https://x/a?",
        "https://x/a\t&utm_source=y\n",
        "?utm_source=y",
        "&utm_source=y",
    ];
    for raw in samples {
        let once = normalize_link(raw);
        assert_eq!(normalize_link(&once), once, "not idempotent for {raw:?}");
    }
}

#[test]
fn glued_tracking_param_matches_stored_link() {
    assert_eq!(normalize_link("https://x/a&utm_source=y"), "https://x/a");
    assert_eq!(normalize_link("https://x/a &utm_source=y"), "https://x/a");
    assert_eq!(normalize_link("https://x/a?b=1 &utm_x=2 #frag"), "https://x/a?b=1#frag");
}

#[test]
fn param_that_merely_contains_utm_is_kept() {
    assert_eq!(
        normalize_link("https://x/a?notutm_x=1&utm=2"),
        "https://x/a?notutm_x=1&utm=2"
    );
}

#[test]
fn normalize_title_output_is_allow_listed_with_single_spaces() {
    let samples = [
        "Brand expands plant",
        "  BRAND   expands\tplant!!! ",
        "Giấy Miza — “Kỷ lục” 2025?",
        "¡¿Ünïcödé?! ☃ ",
        "",
    ];
    for raw in samples {
        let out = normalize_title(raw);
        assert!(!out.contains("  "), "double space in {out:?}");
        assert_eq!(out.trim(), out, "untrimmed {out:?}");
        assert!(
            out.chars().all(|c| c == ' '
                || c.is_ascii_lowercase()
                || c.is_ascii_digit()
                || VIETNAMESE_LETTERS.contains(c)),
            "foreign char in {out:?}"
        );
    }
}

#[test]
fn titles_differing_only_in_case_and_punctuation_collide() {
    assert_eq!(
        normalize_title("Brand expands plant"),
        normalize_title("brand expands plant.")
    );
    assert_eq!(normalize_title("Giấy Miza — “Kỷ lục” 2025?"), "giấy miza kỷ lục 2025");
}

#[test]
fn clean_text_strips_markup_and_caps_length() {
    assert_eq!(clean_text("<p>MZG&#39;s <i>plant</i></p>"), "MZG's plant");
    let long = "x".repeat(800);
    assert_eq!(clean_text(&long).chars().count(), 500);
}
