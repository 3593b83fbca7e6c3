//! HTTP surface, driven through the router with `oneshot`.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use futures_util::future::join_all;
use tower::ServiceExt;

use viewmeter_core::error::{MeterError, Result};
use viewmeter_core::{window, Category};
use viewmeter_server::app_state::AppState;
use viewmeter_server::downstream::Downstream;
use viewmeter_server::router::build_router;

use common::{config_with_store, read_records};

struct FailingDownstream;

#[async_trait]
impl Downstream for FailingDownstream {
    async fn call(&self) -> Result<()> {
        Err(MeterError::Downstream("backend unavailable".into()))
    }
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn welcome_text() {
    let tmp = tempfile::tempdir().unwrap();
    let app = build_router(AppState::new(config_with_store(tmp.path().join("store.txt"))));

    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, window::WELCOME_TEXT);

    let (status, body) = get(&app, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stats_admits_limit_then_rejects() {
    let tmp = tempfile::tempdir().unwrap();
    let app = build_router(AppState::new(config_with_store(tmp.path().join("store.txt"))));

    let n = window::ADMISSION_LIMIT as usize + 1;
    let results = join_all((0..n).map(|_| get(&app, "/stats/"))).await;

    let ok = results.iter().filter(|(s, _)| *s == StatusCode::OK).count();
    let limited = results
        .iter()
        .filter(|(s, _)| *s == StatusCode::TOO_MANY_REQUESTS)
        .count();
    assert_eq!(ok, window::ADMISSION_LIMIT as usize);
    assert_eq!(limited, 1);
    assert!(results.iter().all(|(_, body)| body.is_empty()));
}

#[tokio::test]
async fn stats_recovers_after_release() {
    let tmp = tempfile::tempdir().unwrap();
    let state = AppState::new(config_with_store(tmp.path().join("store.txt")));
    let app = build_router(state.clone());

    for _ in 0..window::ADMISSION_LIMIT {
        assert_eq!(get(&app, "/stats/").await.0, StatusCode::OK);
    }
    assert_eq!(get(&app, "/stats/").await.0, StatusCode::TOO_MANY_REQUESTS);

    assert!(state.gate().release());
    assert_eq!(get(&app, "/stats/").await.0, StatusCode::OK);
    assert_eq!(get(&app, "/stats/").await.0, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn thousand_views_drain_exactly() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("store.txt");
    let state = AppState::new(config_with_store(path.clone()));
    let app = build_router(state.clone());

    let results = join_all((0..1_000).map(|_| get(&app, "/view/"))).await;

    let mut selected: HashMap<String, u64> = HashMap::new();
    let mut clicked: HashMap<String, u64> = HashMap::new();
    for (status, body) in &results {
        assert_eq!(*status, StatusCode::OK);
        let v: serde_json::Value = serde_json::from_str(body).unwrap();
        let category = v["category"].as_str().unwrap().to_string();
        if v["clicked"].as_bool().unwrap() {
            *clicked.entry(category.clone()).or_default() += 1;
        }
        *selected.entry(category).or_default() += 1;
    }

    let report = state.drain_and_persist().await;
    assert_eq!(report.persisted, Category::COUNT);

    let records = read_records(&path);
    assert_eq!(records.len(), Category::COUNT);
    assert_eq!(records.iter().map(|r| r.views).sum::<u64>(), 1_000);
    for r in &records {
        let name = r.category.as_str();
        assert_eq!(r.views, selected.get(name).copied().unwrap_or(0), "{name}");
        assert_eq!(r.clicks, clicked.get(name).copied().unwrap_or(0), "{name}");
        assert!(r.clicks <= r.views);
    }
}

#[tokio::test]
async fn downstream_failure_is_400_and_keeps_the_view() {
    let tmp = tempfile::tempdir().unwrap();
    let state = AppState::new(config_with_store(tmp.path().join("store.txt")))
        .with_downstream(Arc::new(FailingDownstream));
    let app = build_router(state.clone());

    let (status, body) = get(&app, "/view/").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("backend unavailable"), "{body}");

    let counters = state.counters();
    let (views, clicks) = Category::ALL
        .iter()
        .map(|&c| counters.peek(c))
        .fold((0, 0), |(v, c), (pv, pc)| (v + pv, c + pc));
    assert_eq!((views, clicks), (1, 0));
}

#[tokio::test]
async fn metrics_expose_requests_and_gate() {
    let tmp = tempfile::tempdir().unwrap();
    let app = build_router(AppState::new(config_with_store(tmp.path().join("store.txt"))));

    get(&app, "/stats/").await;
    get(&app, "/view/").await;

    let (status, body) = get(&app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        body.contains("viewmeter_http_requests_total{route=\"/stats/\",status=\"200\"} 1"),
        "{body}"
    );
    assert!(
        body.contains("viewmeter_http_requests_total{route=\"/view/\",status=\"200\"} 1"),
        "{body}"
    );
    assert!(body.contains("viewmeter_gate_available 9"), "{body}");
    assert!(
        body.contains("viewmeter_downstream_duration_micros_count{outcome=\"ok\"} 1"),
        "{body}"
    );
}
