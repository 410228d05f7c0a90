//! Garages, bikes, sections and parts

use super::{Reply, created, message, ok};
use crate::AppState;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use axum::{extract::State, http::StatusCode};
use motominder_core::api::{BikeDetail, GarageDetail, PartDetail, SectionDetail, details};
use motominder_core::commands::{
    Bike, BikeRepository, Garage, GarageRepository, NewBike, NewGarage, NewPart, NewSection, Part,
    PartRepository, Section, SectionRepository,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct BikeFilter {
    pub garage_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SectionFilter {
    pub bike_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PartFilter {
    pub section_id: Option<i64>,
}

// ============================================================================
// Garages
// ============================================================================

pub async fn list_garages(State(state): State<AppState>) -> ApiResult<Reply<Vec<Garage>>> {
    Ok(ok(GarageRepository::new(&state.db).list().await?))
}

pub async fn get_garage(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Reply<GarageDetail>> {
    Ok(ok(details::garage(&state.db, id).await?))
}

pub async fn create_garage(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewGarage>,
) -> ApiResult<(StatusCode, Reply<Garage>)> {
    Ok(created(GarageRepository::new(&state.db).create(&input).await?))
}

pub async fn update_garage(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<NewGarage>,
) -> ApiResult<Reply<Garage>> {
    Ok(ok(GarageRepository::new(&state.db).update(id, &input).await?))
}

pub async fn delete_garage(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Reply<()>> {
    GarageRepository::new(&state.db).delete(id).await?;
    Ok(message("Garage deleted successfully"))
}

// ============================================================================
// Bikes
// ============================================================================

pub async fn list_bikes(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<BikeFilter>,
) -> ApiResult<Reply<Vec<Bike>>> {
    Ok(ok(BikeRepository::new(&state.db).list(filter.garage_id).await?))
}

pub async fn get_bike(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Reply<BikeDetail>> {
    Ok(ok(details::bike(&state.db, id).await?))
}

pub async fn create_bike(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewBike>,
) -> ApiResult<(StatusCode, Reply<Bike>)> {
    Ok(created(BikeRepository::new(&state.db).create(&input).await?))
}

pub async fn update_bike(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<NewBike>,
) -> ApiResult<Reply<Bike>> {
    Ok(ok(BikeRepository::new(&state.db).update(id, &input).await?))
}

pub async fn delete_bike(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Reply<()>> {
    BikeRepository::new(&state.db).delete(id).await?;
    Ok(message("Bike deleted successfully"))
}

// ============================================================================
// Sections
// ============================================================================

pub async fn list_sections(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<SectionFilter>,
) -> ApiResult<Reply<Vec<Section>>> {
    Ok(ok(SectionRepository::new(&state.db).list(filter.bike_id).await?))
}

pub async fn get_section(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Reply<SectionDetail>> {
    Ok(ok(details::section(&state.db, id).await?))
}

pub async fn create_section(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewSection>,
) -> ApiResult<(StatusCode, Reply<Section>)> {
    Ok(created(SectionRepository::new(&state.db).create(&input).await?))
}

pub async fn update_section(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<NewSection>,
) -> ApiResult<Reply<Section>> {
    Ok(ok(SectionRepository::new(&state.db).update(id, &input).await?))
}

pub async fn delete_section(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Reply<()>> {
    SectionRepository::new(&state.db).delete(id).await?;
    Ok(message("Section deleted successfully"))
}

// ============================================================================
// Parts
// ============================================================================

pub async fn list_parts(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<PartFilter>,
) -> ApiResult<Reply<Vec<Part>>> {
    Ok(ok(PartRepository::new(&state.db).list(filter.section_id).await?))
}

pub async fn get_part(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Reply<PartDetail>> {
    Ok(ok(details::part(&state.db, id).await?))
}

pub async fn create_part(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewPart>,
) -> ApiResult<(StatusCode, Reply<Part>)> {
    Ok(created(PartRepository::new(&state.db).create(&input).await?))
}

pub async fn update_part(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<NewPart>,
) -> ApiResult<Reply<Part>> {
    Ok(ok(PartRepository::new(&state.db).update(id, &input).await?))
}

pub async fn delete_part(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Reply<()>> {
    PartRepository::new(&state.db).delete(id).await?;
    Ok(message("Part deleted successfully"))
}
