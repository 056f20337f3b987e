//! Staff-only endpoints.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use yatube_common::AppResult;
use yatube_core::CreateGroupInput;
use yatube_db::entities::group;

use crate::{extractors::StaffUser, middleware::AppState};

/// Create a group; the slug is derived from the title when not given.
async fn create_group(
    StaffUser(user): StaffUser,
    State(state): State<AppState>,
    Json(input): Json<CreateGroupInput>,
) -> AppResult<(StatusCode, Json<group::Model>)> {
    let group = state.group_service.create(input).await?;
    tracing::info!(group_id = group.id, staff = %user.username, "Group created by staff");
    Ok((StatusCode::CREATED, Json(group)))
}

/// Drop every cached page.
async fn clear_cache(
    StaffUser(user): StaffUser,
    State(state): State<AppState>,
) -> AppResult<StatusCode> {
    state.page_cache.clear().await?;
    tracing::info!(staff = %user.username, "Page cache cleared by staff");
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/groups/", post(create_group))
        .route("/cache/clear/", post(clear_cache))
}
