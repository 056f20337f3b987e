//! Page endpoints.

mod about;
mod admin;
mod auth;
mod posts;
mod profile;

use axum::{
    Router,
    extract::{DefaultBodyLimit, OriginalUri},
    middleware::from_fn_with_state,
};
use tower_http::services::ServeDir;
use yatube_common::AppError;

use crate::middleware::{AppState, auth_middleware};

/// Upper bound on request bodies, sized for image uploads.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Create the page router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(posts::router())
        .merge(profile::router())
        .nest("/about", about::router())
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
        .fallback(not_found)
}

/// Build the complete application: routes, session resolution and media files.
pub fn app(state: AppState) -> Router {
    let media_url = state.media.url.trim_end_matches('/').to_string();

    let mut app = router();
    if media_url.is_empty() {
        tracing::warn!("media.url is the site root; uploaded files will not be served");
    } else {
        app = app.nest_service(&media_url, ServeDir::new(&state.media.root));
    }

    app.layer(from_fn_with_state(state.clone(), auth_middleware))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

async fn not_found(OriginalUri(uri): OriginalUri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}
