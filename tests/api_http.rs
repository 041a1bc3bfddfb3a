// tests/api_http.rs
//
// HTTP-level tests for the health/debug router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.

use std::sync::Arc;

use chrono::{FixedOffset, TimeZone};
use serde_json::Value as Json;
use shuttle_axum::axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use tower::ServiceExt as _; // for `oneshot`

use mention_relay::api::{router, AppState};
use mention_relay::history::{JobKind, PassHistory, PassSummary};
use mention_relay::PassStats;

const BODY_LIMIT: usize = 1024 * 1024;

fn history_with(n: u32) -> Arc<PassHistory> {
    let tz = FixedOffset::east_opt(7 * 3600).unwrap();
    let h = Arc::new(PassHistory::with_capacity(100));
    for i in 0..n {
        h.push(PassSummary {
            job: if i % 2 == 0 { JobKind::Realtime } else { JobKind::Digest },
            finished_at: tz.with_ymd_and_hms(2025, 10, 1, 9, i, 0).unwrap(),
            stats: PassStats {
                fetched: i as usize,
                ..PassStats::default()
            },
            delivered: 0,
            failed_deliveries: 0,
        });
    }
    h
}

async fn get(state: AppState, uri: &str) -> (StatusCode, String) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let resp = router(state).oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    (status, String::from_utf8(bytes).expect("utf8"))
}

#[tokio::test]
async fn health_is_ok() {
    let (status, body) = get(AppState::new(history_with(0)), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn debug_passes_returns_last_ten_by_default() {
    let (status, body) = get(AppState::new(history_with(15)), "/debug/passes").await;
    assert_eq!(status, StatusCode::OK);
    let v: Json = serde_json::from_str(&body).unwrap();
    let arr = v.as_array().unwrap();
    assert_eq!(arr.len(), 10);
    assert_eq!(arr[9]["stats"]["fetched"], 14);
    assert_eq!(arr[9]["job"], "realtime");
    assert_eq!(arr[0]["job"], "digest");
}

#[tokio::test]
async fn debug_passes_honours_n() {
    let (_, body) = get(AppState::new(history_with(15)), "/debug/passes?n=3").await;
    let v: Json = serde_json::from_str(&body).unwrap();
    assert_eq!(v.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn metrics_without_recorder_is_unavailable() {
    let (status, _) = get(AppState::new(history_with(0)), "/metrics").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
