//! Request extractors.

use axum::{
    extract::{FromRequestParts, OriginalUri, Path},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use yatube_common::AppError;
use yatube_db::entities::user;

use crate::response::found;

/// Login page that anonymous users are sent to.
pub const LOGIN_URL: &str = "/auth/login/";

/// Optional authenticated user extractor.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<user::Model>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<user::Model>().cloned()))
    }
}

/// Authenticated user for page endpoints.
///
/// Anonymous requests are redirected to the login page with the original
/// path and query in `next`.
#[derive(Debug, Clone)]
pub struct LoginRequired(pub user::Model);

impl<S> FromRequestParts<S> for LoginRequired
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<user::Model>()
            .cloned()
            .map(LoginRequired)
            .ok_or_else(|| login_redirect(parts))
    }
}

/// Staff member for administrative endpoints.
///
/// Anonymous requests get the login redirect; other users get 403.
#[derive(Debug, Clone)]
pub struct StaffUser(pub user::Model);

impl<S> FromRequestParts<S> for StaffUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let LoginRequired(user) = LoginRequired::from_request_parts(parts, state).await?;
        if !user.is_staff {
            return Err(AppError::Forbidden(format!("{} is not staff", user.username))
                .into_response());
        }
        Ok(Self(user))
    }
}

/// Post ID from the `{post_id}` path segment. Non-numeric IDs are not found.
#[derive(Debug, Clone, Copy)]
pub struct PostId(pub i32);

impl<S> FromRequestParts<S> for PostId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        raw.parse()
            .map(Self)
            .map_err(|_| AppError::PostNotFound(raw))
    }
}

fn login_redirect(parts: &Parts) -> Response {
    let uri = parts
        .extensions
        .get::<OriginalUri>()
        .map_or(&parts.uri, |original| &original.0);
    let next = uri.path_and_query().map_or("/", |pq| pq.as_str());
    found(&login_url(next))
}

/// Login URL returning to `next` afterwards. Slashes stay unescaped.
#[must_use]
pub fn login_url(next: &str) -> String {
    format!(
        "{LOGIN_URL}?next={}",
        urlencoding::encode(next).replace("%2F", "/")
    )
}
