use crate::error::reveal_internal_errors;
use crate::{AppState, handlers};
use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use handlers::{fleet, maintenance, search, tags};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Build the main API router
pub fn build_router(state: AppState) -> Router {
    let expose_internal_errors = state.expose_internal_errors;

    let router = Router::new()
        // Health
        .route("/health", get(handlers::health_check))
        // Search
        .route("/api/search", get(search::search))
        // Tags
        .route("/api/tags", get(tags::list_tags).post(tags::create_tag))
        .route("/api/tags/assign", post(tags::assign_tag))
        .route("/api/tags/remove", delete(tags::remove_tag))
        .route(
            "/api/tags/:id",
            get(tags::get_tag)
                .put(tags::update_tag)
                .delete(tags::delete_tag),
        )
        .route("/api/tags/:id/items", get(tags::tag_items))
        // Garages
        .route(
            "/api/garages",
            get(fleet::list_garages).post(fleet::create_garage),
        )
        .route(
            "/api/garages/:id",
            get(fleet::get_garage)
                .put(fleet::update_garage)
                .delete(fleet::delete_garage),
        )
        // Bikes
        .route("/api/bikes", get(fleet::list_bikes).post(fleet::create_bike))
        .route(
            "/api/bikes/:id",
            get(fleet::get_bike)
                .put(fleet::update_bike)
                .delete(fleet::delete_bike),
        )
        // Sections
        .route(
            "/api/sections",
            get(fleet::list_sections).post(fleet::create_section),
        )
        .route(
            "/api/sections/:id",
            get(fleet::get_section)
                .put(fleet::update_section)
                .delete(fleet::delete_section),
        )
        // Parts
        .route("/api/parts", get(fleet::list_parts).post(fleet::create_part))
        .route(
            "/api/parts/:id",
            get(fleet::get_part)
                .put(fleet::update_part)
                .delete(fleet::delete_part),
        )
        // Maintenance
        .route(
            "/api/maintenance",
            get(maintenance::list_maintenance).post(maintenance::create_maintenance),
        )
        .route(
            "/api/maintenance/upcoming",
            get(maintenance::upcoming_maintenance),
        )
        .route(
            "/api/maintenance/:id",
            get(maintenance::get_maintenance)
                .put(maintenance::update_maintenance)
                .delete(maintenance::delete_maintenance),
        )
        .route(
            "/api/maintenance/:id/complete",
            post(maintenance::complete_maintenance),
        )
        .with_state(state);

    let router = if expose_internal_errors {
        router.layer(middleware::map_response(reveal_internal_errors))
    } else {
        router
    };

    router
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
}
