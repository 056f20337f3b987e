//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use sea_orm::DatabaseConnection;
use yatube_common::{Config, StorageBackend, config::MediaConfig};
use yatube_core::{
    CommentService, FeedService, FollowingService, GroupService, PageCache, PostPresenter,
    PostService, UserService,
};
use yatube_db::repositories::{
    CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository,
};

use crate::response::{JsonRenderer, Renderer};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "sessionid";

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub feed_service: FeedService,
    pub post_service: PostService,
    pub comment_service: CommentService,
    pub following_service: FollowingService,
    pub group_service: GroupService,
    pub page_cache: Arc<dyn PageCache>,
    pub renderer: Arc<dyn Renderer>,
    /// How long a rendered global feed page stays cached.
    pub index_ttl: Duration,
    pub media: MediaConfig,
}

impl AppState {
    /// Wire repositories and services over one database connection.
    #[must_use]
    pub fn new(
        db: Arc<DatabaseConnection>,
        storage: Arc<dyn StorageBackend>,
        page_cache: Arc<dyn PageCache>,
        config: &Config,
    ) -> Self {
        let user_repo = UserRepository::new(Arc::clone(&db));
        let group_repo = GroupRepository::new(Arc::clone(&db));
        let post_repo = PostRepository::new(Arc::clone(&db));
        let comment_repo = CommentRepository::new(Arc::clone(&db));
        let follow_repo = FollowRepository::new(db);

        let presenter =
            PostPresenter::new(user_repo.clone(), group_repo.clone(), Arc::clone(&storage));

        Self {
            user_service: UserService::new(user_repo.clone()),
            feed_service: FeedService::new(
                post_repo.clone(),
                user_repo.clone(),
                group_repo.clone(),
                follow_repo.clone(),
                presenter.clone(),
            ),
            post_service: PostService::new(
                post_repo.clone(),
                group_repo.clone(),
                comment_repo.clone(),
                presenter,
                storage,
            ),
            comment_service: CommentService::new(comment_repo, post_repo),
            following_service: FollowingService::new(follow_repo, user_repo),
            group_service: GroupService::new(group_repo),
            page_cache,
            renderer: Arc::new(JsonRenderer),
            index_ttl: Duration::from_secs(config.cache.index_ttl_secs),
            media: config.media.clone(),
        }
    }
}

/// Authentication middleware.
///
/// Resolves the session token from the `sessionid` cookie or an
/// `Authorization: Bearer` header and stores the user in request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = CookieJar::from_headers(req.headers())
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .or_else(|| {
            req.headers()
                .get(AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer "))
                .map(ToString::to_string)
        });

    if let Some(token) = token {
        match state.user_service.authenticate_by_token(&token).await {
            Ok(Some(user)) => {
                req.extensions_mut().insert(user);
            }
            Ok(None) => tracing::debug!("Unknown session token"),
            Err(e) => tracing::warn!(error = %e, "Failed to resolve session"),
        }
    }

    next.run(req).await
}
