//! Tag catalogue and tag assignments

use super::{Reply, created, message, ok};
use crate::AppState;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath};
use axum::{Json, extract::State, http::StatusCode};
use motominder_core::api::ApiResponse;
use motominder_core::domain::tags::{
    NewTag, Tag, TagAssignment, TagIndex, TagItems, TagRepository, TaggedItem,
};

pub async fn list_tags(State(state): State<AppState>) -> ApiResult<Reply<Vec<Tag>>> {
    Ok(ok(TagRepository::new(&state.db).list().await?))
}

pub async fn get_tag(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Reply<Tag>> {
    Ok(ok(TagRepository::new(&state.db).require(id).await?))
}

pub async fn create_tag(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewTag>,
) -> ApiResult<(StatusCode, Reply<Tag>)> {
    Ok(created(TagRepository::new(&state.db).create(&input).await?))
}

pub async fn update_tag(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<NewTag>,
) -> ApiResult<Reply<Tag>> {
    Ok(ok(TagRepository::new(&state.db).update(id, &input).await?))
}

pub async fn delete_tag(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Reply<()>> {
    TagRepository::new(&state.db).delete(id).await?;
    Ok(message("Tag deleted successfully"))
}

/// `POST /api/tags/assign` with `{tagId, itemType, itemId, notes?}`
pub async fn assign_tag(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<TagAssignment>,
) -> ApiResult<(StatusCode, Reply<TaggedItem>)> {
    let (tag_id, item) = request.target()?;
    let assignment = TagIndex::new(&state.db)
        .assign(tag_id, item, request.notes)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(assignment).with_message("Tag assigned successfully")),
    ))
}

/// `DELETE /api/tags/remove` with `{tagId, itemType, itemId}`
pub async fn remove_tag(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<TagAssignment>,
) -> ApiResult<Reply<()>> {
    let (tag_id, item) = request.target()?;
    TagIndex::new(&state.db).remove(tag_id, item).await?;
    Ok(message("Tag removed successfully"))
}

pub async fn tag_items(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Reply<TagItems>> {
    Ok(ok(TagIndex::new(&state.db).items_for_tag(id).await?))
}
