//! Comment service.

use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use tracing::{debug, info};
use validator::Validate;
use yatube_common::AppResult;
use yatube_db::{
    entities::comment,
    repositories::{CommentRepository, PostRepository},
};

/// Input for adding a comment.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CommentInput {
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub text: String,
}

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    post_repo: PostRepository,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(comment_repo: CommentRepository, post_repo: PostRepository) -> Self {
        Self {
            comment_repo,
            post_repo,
        }
    }

    /// Attach a comment by `author_id` to a post.
    ///
    /// A missing post is an error. Invalid input is dropped and yields `None`.
    pub async fn add(
        &self,
        post_id: i32,
        author_id: i32,
        mut input: CommentInput,
    ) -> AppResult<Option<comment::Model>> {
        let post = self.post_repo.get_by_id(post_id).await?;

        input.text = input.text.trim().to_string();
        if let Err(errors) = input.validate() {
            debug!(post_id, errors = %errors, "Discarded invalid comment");
            return Ok(None);
        }

        let model = comment::ActiveModel {
            post_id: Set(post.id),
            author_id: Set(author_id),
            text: Set(input.text),
            created: Set(Utc::now().into()),
            ..Default::default()
        };

        let comment = self.comment_repo.create(model).await?;
        info!(comment_id = comment.id, post_id, author_id, "Added comment");

        Ok(Some(comment))
    }
}
