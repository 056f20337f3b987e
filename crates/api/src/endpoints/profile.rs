//! Author pages and following.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Response,
    routing::get,
};
use yatube_common::AppResult;

use crate::{
    endpoints::posts::PageQuery,
    extractors::{LoginRequired, MaybeAuthUser},
    middleware::AppState,
    response::{RenderedPage, found, to_context},
};

async fn profile(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<RenderedPage> {
    let feed = state
        .feed_service
        .profile(&username, query.page.as_deref(), viewer.as_ref())
        .await?;
    RenderedPage::render(
        state.renderer.as_ref(),
        "posts/profile.html",
        to_context(&feed)?,
    )
}

async fn profile_follow(
    LoginRequired(user): LoginRequired,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Response> {
    let (author, _) = state.following_service.follow(&user, &username).await?;
    Ok(found(&format!("/profile/{}/", author.username)))
}

async fn profile_unfollow(
    LoginRequired(user): LoginRequired,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Response> {
    let (author, _) = state.following_service.unfollow(&user, &username).await?;
    Ok(found(&format!("/profile/{}/", author.username)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile/{username}/", get(profile))
        .route(
            "/profile/{username}/follow/",
            get(profile_follow).post(profile_follow),
        )
        .route(
            "/profile/{username}/unfollow/",
            get(profile_unfollow).post(profile_unfollow),
        )
}
