//! Maintenance log and schedule

use super::{Reply, created, message, ok};
use crate::AppState;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use axum::{extract::State, http::StatusCode};
use chrono::{Local, NaiveDate};
use motominder_core::commands::{MaintenanceEntry, MaintenanceRepository, NewMaintenance};
use serde::Deserialize;

const DEFAULT_UPCOMING_DAYS: u32 = 30;

#[derive(Debug, Default, Deserialize)]
pub struct MaintenanceFilter {
    pub bike_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpcomingParams {
    pub days: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompleteRequest {
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub async fn list_maintenance(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<MaintenanceFilter>,
) -> ApiResult<Reply<Vec<MaintenanceEntry>>> {
    Ok(ok(MaintenanceRepository::new(&state.db)
        .list(filter.bike_id)
        .await?))
}

pub async fn get_maintenance(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Reply<MaintenanceEntry>> {
    Ok(ok(MaintenanceRepository::new(&state.db).require(id).await?))
}

pub async fn create_maintenance(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewMaintenance>,
) -> ApiResult<(StatusCode, Reply<MaintenanceEntry>)> {
    Ok(created(
        MaintenanceRepository::new(&state.db).create(&input).await?,
    ))
}

pub async fn update_maintenance(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<NewMaintenance>,
) -> ApiResult<Reply<MaintenanceEntry>> {
    Ok(ok(MaintenanceRepository::new(&state.db)
        .update(id, &input)
        .await?))
}

pub async fn delete_maintenance(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Reply<()>> {
    MaintenanceRepository::new(&state.db).delete(id).await?;
    Ok(message("Maintenance record deleted successfully"))
}

/// Scheduled work due within `days` (default 30)
pub async fn upcoming_maintenance(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<UpcomingParams>,
) -> ApiResult<Reply<Vec<MaintenanceEntry>>> {
    let days = params.days.unwrap_or(DEFAULT_UPCOMING_DAYS);
    Ok(ok(MaintenanceRepository::new(&state.db)
        .upcoming(today(), days)
        .await?))
}

/// Mark scheduled work as done; the body's `date` defaults to today
pub async fn complete_maintenance(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    body: Option<ApiJson<CompleteRequest>>,
) -> ApiResult<Reply<MaintenanceEntry>> {
    let date = body
        .and_then(|ApiJson(request)| request.date)
        .unwrap_or_else(today);
    Ok(ok(MaintenanceRepository::new(&state.db)
        .complete(id, date)
        .await?))
}
