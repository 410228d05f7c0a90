//! Request handlers

pub mod fleet;
pub mod maintenance;
pub mod search;
pub mod tags;

use crate::AppState;
use axum::{Json, extract::State, http::StatusCode};
use motominder_core::api::{ApiResponse, HealthReport, health};

/// Enveloped JSON body
pub type Reply<T, M = ()> = Json<ApiResponse<T, M>>;

pub(crate) fn ok<T>(data: T) -> Reply<T> {
    Json(ApiResponse::ok(data))
}

pub(crate) fn created<T>(data: T) -> (StatusCode, Reply<T>) {
    (StatusCode::CREATED, Json(ApiResponse::ok(data)))
}

pub(crate) fn message(text: &str) -> Reply<()> {
    Json(ApiResponse::message(text))
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Reply<HealthReport>) {
    let report = health::health(&state.db).await;
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, ok(report))
}
