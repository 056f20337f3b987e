//! Account pages: signup, login and logout.

use axum::{
    Form, Router,
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use serde_json::json;
use yatube_common::AppResult;
use yatube_core::{FormErrors, SignupInput, Submission};

use crate::{
    extractors::MaybeAuthUser,
    middleware::{AppState, SESSION_COOKIE},
    response::{RenderedPage, found, to_context},
};

const INVALID_LOGIN: &str = "Please enter a correct username and password. Note that both fields may be case-sensitive.";

/// Login form.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// `?next=` query parameter.
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Only same-site absolute paths are followed after login.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(next) if next.starts_with('/') && !next.starts_with("//") && !next.contains('\\') => {
            next
        }
        _ => "/",
    }
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

async fn signup_form(State(state): State<AppState>) -> AppResult<RenderedPage> {
    RenderedPage::render(
        state.renderer.as_ref(),
        "users/signup.html",
        json!({ "form": {}, "errors": {} }),
    )
}

async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(input): Form<SignupInput>,
) -> AppResult<Response> {
    let echo = json!({
        "username": input.username,
        "first_name": input.first_name,
        "last_name": input.last_name,
        "email": input.email,
    });

    match state.user_service.signup(input).await? {
        Submission::Accepted(user) => {
            let jar = match user.token {
                Some(token) => jar.add(session_cookie(token)),
                None => jar,
            };
            Ok((jar, found("/")).into_response())
        }
        Submission::Rejected(errors) => Ok(RenderedPage::render(
            state.renderer.as_ref(),
            "users/signup.html",
            json!({ "form": echo, "errors": to_context(&errors)? }),
        )?
        .into_response()),
    }
}

async fn login_form(
    State(state): State<AppState>,
    Query(query): Query<NextQuery>,
) -> AppResult<RenderedPage> {
    RenderedPage::render(
        state.renderer.as_ref(),
        "users/login.html",
        json!({ "form": {}, "errors": {}, "next": query.next }),
    )
}

async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    if let Some((user, token)) = state
        .user_service
        .login(&form.username, &form.password)
        .await?
    {
        tracing::info!(user_id = user.id, "Logged in");
        let target = safe_next(form.next.as_deref()).to_string();
        return Ok((jar.add(session_cookie(token)), found(&target)).into_response());
    }

    let mut errors = FormErrors::new();
    errors.add("__all__", INVALID_LOGIN);
    Ok(RenderedPage::render(
        state.renderer.as_ref(),
        "users/login.html",
        json!({
            "form": { "username": form.username },
            "errors": to_context(&errors)?,
            "next": form.next,
        }),
    )?
    .into_response())
}

/// End every session of the current user and drop the cookie.
async fn logout(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<Response> {
    if let Some(user) = user {
        state.user_service.logout(user.id).await?;
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    let page = RenderedPage::render(state.renderer.as_ref(), "users/logged_out.html", json!({}))?;
    Ok((jar, page).into_response())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup/", get(signup_form).post(signup))
        .route("/login/", get(login_form).post(login))
        .route("/logout/", get(logout).post(logout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/posts/1/edit/")), "/posts/1/edit/");
        assert_eq!(safe_next(Some("https://evil.example/")), "/");
        assert_eq!(safe_next(Some("//evil.example/")), "/");
        assert_eq!(safe_next(None), "/");
    }
}
