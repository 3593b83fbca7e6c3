//! Public HTTP endpoints.
//!
//! - `/`       : welcome text
//! - `/view/`  : record a view (and maybe a click) for a random category
//! - `/stats/` : admission-gated, 429 once the gate is exhausted

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rand::Rng;
use serde::Serialize;
use tokio::time::Instant;

use viewmeter_core::error::{ClientCode, MeterError};
use viewmeter_core::{window, Category};

use crate::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub category: Category,
    pub clicked: bool,
}

pub async fn welcome() -> impl IntoResponse {
    (StatusCode::OK, window::WELCOME_TEXT)
}

pub async fn view(State(app): State<AppState>) -> Response {
    let category = Category::pick(&mut rand::thread_rng());
    let counters = app.counters();
    counters.record_view(category);

    let started = Instant::now();
    let called = app.downstream().call().await;
    let outcome = if called.is_ok() { "ok" } else { "error" };
    app.metrics()
        .downstream_duration
        .observe(&[("outcome", outcome)], started.elapsed());

    if let Err(e) = called {
        tracing::warn!(%category, error = %e, "downstream call failed");
        return respond(&app, "/view/", status_for(&e), e.to_string());
    }

    let clicked = rand::thread_rng().gen_bool(window::CLICK_PROBABILITY);
    if clicked {
        counters.record_click(category);
    }

    count(&app, "/view/", StatusCode::OK);
    (StatusCode::OK, Json(ViewResponse { category, clicked })).into_response()
}

pub async fn stats(State(app): State<AppState>) -> Response {
    if !app.gate().try_admit() {
        return respond(&app, "/stats/", status_for(&MeterError::RateLimited), "");
    }
    respond(&app, "/stats/", StatusCode::OK, "")
}

/// HTTP status for an error surfaced by a handler.
pub fn status_for(err: &MeterError) -> StatusCode {
    match err.client_code() {
        ClientCode::BadRequest | ClientCode::UnsupportedVersion => StatusCode::BAD_REQUEST,
        ClientCode::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ClientCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn count(app: &AppState, route: &str, status: StatusCode) {
    app.metrics()
        .http_requests
        .inc(&[("route", route), ("status", status.as_str())]);
}

fn respond(app: &AppState, route: &str, status: StatusCode, body: impl Into<String>) -> Response {
    count(app, route, status);
    (status, body.into()).into_response()
}
