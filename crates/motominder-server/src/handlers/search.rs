use super::Reply;
use crate::AppState;
use crate::error::ApiResult;
use crate::extract::ApiQuery;
use axum::{Json, extract::State};
use motominder_core::api::{SearchMeta, SearchParams, search as search_api};
use motominder_core::domain::search::SearchResults;

/// `GET /api/search?query=&tags=a,b&type=part`
pub async fn search(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> ApiResult<Reply<SearchResults, SearchMeta>> {
    Ok(Json(search_api::search(&state.db, &params).await?))
}
