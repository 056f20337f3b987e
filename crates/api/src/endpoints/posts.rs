//! Feed, post and comment pages.

use axum::{
    Form, Router,
    extract::{Path, Query, State, rejection::FormRejection},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::warn;
use yatube_common::{AppError, AppResult};
use yatube_core::{CommentInput, FormErrors, PostInput, Submission, page_cache::index_page_key};
use yatube_db::entities::post;

use crate::{
    extractors::{LoginRequired, PostId},
    forms::PostForm,
    middleware::AppState,
    response::{RenderedPage, found, to_context},
};

/// `?page=` query parameter, kept raw so bad values fall back to page 1.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// Global feed. Each page is cached for the configured TTL; an unavailable
/// cache only costs a fresh render.
async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<RenderedPage> {
    let key = index_page_key(query.page.as_deref());

    match state.page_cache.get(&key).await {
        Ok(Some(body)) => {
            return Ok(RenderedPage {
                body,
                content_type: state.renderer.content_type(),
            });
        }
        Ok(None) => {}
        Err(e) => warn!(error = %e, key = %key, "Page cache read failed, rendering"),
    }

    let page_obj = state.feed_service.index(query.page.as_deref()).await?;
    let page = RenderedPage::render(
        state.renderer.as_ref(),
        "posts/index.html",
        json!({ "page_obj": to_context(&page_obj)? }),
    )?;

    if let Err(e) = state
        .page_cache
        .set(&key, &page.body, state.index_ttl)
        .await
    {
        warn!(error = %e, key = %key, "Page cache write failed");
    }

    Ok(page)
}

async fn group_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<RenderedPage> {
    let feed = state.feed_service.group(&slug, query.page.as_deref()).await?;
    RenderedPage::render(
        state.renderer.as_ref(),
        "posts/group_list.html",
        to_context(&feed)?,
    )
}

async fn post_detail(
    State(state): State<AppState>,
    PostId(post_id): PostId,
) -> AppResult<RenderedPage> {
    let detail = state.post_service.detail(post_id).await?;
    RenderedPage::render(
        state.renderer.as_ref(),
        "posts/post_detail.html",
        json!({
            "author": to_context(&detail.post.author)?,
            "post": to_context(&detail.post)?,
            "posts_count": detail.posts_count,
            "comments": to_context(&detail.comments)?,
            "form": { "text": "" },
        }),
    )
}

/// Render the create/edit form.
async fn post_form(
    state: &AppState,
    form: Value,
    errors: &FormErrors,
    post: Option<&post::Model>,
) -> AppResult<RenderedPage> {
    let groups = state.group_service.list().await?;
    RenderedPage::render(
        state.renderer.as_ref(),
        "posts/create_post.html",
        json!({
            "form": form,
            "errors": to_context(errors)?,
            "is_edit": post.is_some(),
            "post": to_context(&post)?,
            "groups": to_context(&groups)?,
        }),
    )
}

fn echo_input(input: &PostInput) -> Value {
    json!({ "text": input.text, "group": input.group })
}

async fn post_create_form(
    LoginRequired(_user): LoginRequired,
    State(state): State<AppState>,
) -> AppResult<RenderedPage> {
    let form = json!({ "text": "", "group": null });
    post_form(&state, form, &FormErrors::new(), None).await
}

async fn post_create(
    LoginRequired(user): LoginRequired,
    State(state): State<AppState>,
    PostForm(input): PostForm,
) -> AppResult<Response> {
    let form = echo_input(&input);
    match state.post_service.create(&user, input).await? {
        Submission::Accepted(_) => Ok(found(&format!("/profile/{}/", user.username))),
        Submission::Rejected(errors) => Ok(post_form(&state, form, &errors, None)
            .await?
            .into_response()),
    }
}

async fn post_edit_form(
    LoginRequired(user): LoginRequired,
    State(state): State<AppState>,
    PostId(post_id): PostId,
) -> AppResult<Response> {
    let post = match state.post_service.get_for_edit(post_id, user.id).await {
        Ok(post) => post,
        Err(AppError::Forbidden(_)) => return Ok(found(&format!("/posts/{post_id}/"))),
        Err(e) => return Err(e),
    };

    let form = json!({ "text": post.text, "group": post.group_id.map(|id| id.to_string()) });
    Ok(post_form(&state, form, &FormErrors::new(), Some(&post))
        .await?
        .into_response())
}

async fn post_edit(
    LoginRequired(user): LoginRequired,
    State(state): State<AppState>,
    PostId(post_id): PostId,
    PostForm(input): PostForm,
) -> AppResult<Response> {
    let detail_url = format!("/posts/{post_id}/");
    let form = echo_input(&input);

    match state.post_service.edit(post_id, user.id, input).await {
        Ok(Submission::Accepted(_)) => Ok(found(&detail_url)),
        Ok(Submission::Rejected(errors)) => {
            let post = state.post_service.get(post_id).await?;
            Ok(post_form(&state, form, &errors, Some(&post))
                .await?
                .into_response())
        }
        Err(AppError::Forbidden(_)) => Ok(found(&detail_url)),
        Err(e) => Err(e),
    }
}

/// Comment on a post. Always returns to the post, even when the comment is
/// rejected.
async fn add_comment(
    LoginRequired(user): LoginRequired,
    State(state): State<AppState>,
    PostId(post_id): PostId,
    form: Result<Form<CommentInput>, FormRejection>,
) -> AppResult<Response> {
    let input = form.map(|Form(input)| input).unwrap_or_default();
    state.comment_service.add(post_id, user.id, input).await?;
    Ok(found(&format!("/posts/{post_id}/")))
}

/// Posts by authors the viewer follows.
async fn follow_index(
    LoginRequired(user): LoginRequired,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<RenderedPage> {
    let page_obj = state
        .feed_service
        .follow(user.id, query.page.as_deref())
        .await?;
    RenderedPage::render(
        state.renderer.as_ref(),
        "posts/follow.html",
        json!({ "page_obj": to_context(&page_obj)? }),
    )
}

/// Comments are only accepted by POST; anything else goes back to the post.
async fn comment_get(LoginRequired(_user): LoginRequired, PostId(post_id): PostId) -> Response {
    found(&format!("/posts/{post_id}/"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/group/{slug}/", get(group_posts))
        .route("/posts/create/", get(post_create_form).post(post_create))
        .route("/posts/{post_id}/", get(post_detail))
        .route("/posts/{post_id}/edit/", get(post_edit_form).post(post_edit))
        .route("/posts/{post_id}/comment/", get(comment_get).post(add_comment))
        .route("/follow/", get(follow_index))
}
