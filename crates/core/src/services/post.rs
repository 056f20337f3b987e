//! Post service: creating, editing and viewing single posts.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::Set;
use serde::Serialize;
use tracing::info;
use yatube_common::{AppError, AppResult, StorageBackend};
use yatube_db::{
    entities::{post, user},
    repositories::{CommentRepository, GroupRepository, PostRepository},
};

use crate::form::{FormErrors, INVALID_CHOICE, INVALID_IMAGE, REQUIRED, Submission};
use crate::services::presenter::{CommentView, PostPresenter, PostView};

/// Directory uploaded post images are stored under.
pub const IMAGE_PREFIX: &str = "posts";

/// An uploaded image file.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// Raw post form input.
#[derive(Debug, Clone, Default)]
pub struct PostInput {
    pub text: String,
    /// Group ID as submitted; blank means no group.
    pub group: Option<String>,
    pub image: Option<ImageUpload>,
}

struct CleanPost {
    text: String,
    group_id: Option<i32>,
    image: Option<(ImageUpload, &'static str)>,
}

/// A post with its comments, oldest first.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: PostView,
    pub posts_count: u64,
    pub comments: Vec<CommentView>,
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    group_repo: GroupRepository,
    comment_repo: CommentRepository,
    presenter: PostPresenter,
    storage: Arc<dyn StorageBackend>,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub fn new(
        post_repo: PostRepository,
        group_repo: GroupRepository,
        comment_repo: CommentRepository,
        presenter: PostPresenter,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            post_repo,
            group_repo,
            comment_repo,
            presenter,
            storage,
        }
    }

    /// Get a post by ID.
    pub async fn get(&self, id: i32) -> AppResult<post::Model> {
        self.post_repo.get_by_id(id).await
    }

    /// A post with its author's post count and its comments.
    pub async fn detail(&self, id: i32) -> AppResult<PostDetail> {
        let post = self.post_repo.get_by_id(id).await?;
        let posts_count = self.post_repo.count_by_author(post.author_id).await?;
        let comments = self.comment_repo.find_by_post(id).await?;

        let post = self
            .presenter
            .post(post)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Author of post {id} is missing")))?;

        Ok(PostDetail {
            post,
            posts_count,
            comments: self.presenter.comments(comments).await?,
        })
    }

    /// Publish a new post by `author`.
    pub async fn create(
        &self,
        author: &user::Model,
        input: PostInput,
    ) -> AppResult<Submission<post::Model>> {
        let clean = match self.clean(input).await? {
            Ok(clean) => clean,
            Err(errors) => return Ok(Submission::Rejected(errors)),
        };

        let image = match clean.image {
            Some(upload) => Some(self.store_image(upload).await?),
            None => None,
        };

        let model = post::ActiveModel {
            text: Set(clean.text),
            pub_date: Set(Utc::now().into()),
            author_id: Set(author.id),
            group_id: Set(clean.group_id),
            image: Set(image),
            ..Default::default()
        };

        let post = self.post_repo.create(model).await?;
        info!(post_id = post.id, author = %author.username, post = %post, "Created post");

        Ok(Submission::Accepted(post))
    }

    /// Load a post for editing; only its author may edit it.
    pub async fn get_for_edit(&self, id: i32, editor_id: i32) -> AppResult<post::Model> {
        let post = self.post_repo.get_by_id(id).await?;
        if post.author_id != editor_id {
            return Err(AppError::Forbidden(format!(
                "User {editor_id} is not the author of post {id}"
            )));
        }
        Ok(post)
    }

    /// Update a post in place. Author and publication date never change.
    ///
    /// Leaving the image out keeps the current one; leaving the group out
    /// removes the post from its group.
    pub async fn edit(
        &self,
        id: i32,
        editor_id: i32,
        input: PostInput,
    ) -> AppResult<Submission<post::Model>> {
        let post = self.get_for_edit(id, editor_id).await?;

        let clean = match self.clean(input).await? {
            Ok(clean) => clean,
            Err(errors) => return Ok(Submission::Rejected(errors)),
        };

        let mut active: post::ActiveModel = post.into();
        active.text = Set(clean.text);
        active.group_id = Set(clean.group_id);
        if let Some(upload) = clean.image {
            active.image = Set(Some(self.store_image(upload).await?));
        }

        let post = self.post_repo.update(active).await?;
        info!(post_id = post.id, post = %post, "Edited post");

        Ok(Submission::Accepted(post))
    }

    async fn clean(&self, input: PostInput) -> AppResult<Result<CleanPost, FormErrors>> {
        let mut errors = FormErrors::new();

        let text = input.text.trim().to_string();
        if text.is_empty() {
            errors.add("text", REQUIRED);
        }

        let group_id = match input.group.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match raw.parse::<i32>() {
                Ok(id) if self.group_repo.find_by_id(id).await?.is_some() => Some(id),
                _ => {
                    errors.add("group", INVALID_CHOICE);
                    None
                }
            },
        };

        let image = match input.image {
            Some(upload) => match check_image(&upload.data) {
                Some(content_type) => Some((upload, content_type)),
                None => {
                    errors.add("image", INVALID_IMAGE);
                    None
                }
            },
            None => None,
        };

        if !errors.is_empty() {
            return Ok(Err(errors));
        }

        Ok(Ok(CleanPost {
            text,
            group_id,
            image,
        }))
    }

    async fn store_image(
        &self,
        (upload, content_type): (ImageUpload, &'static str),
    ) -> AppResult<String> {
        let key = self
            .storage
            .available_key(IMAGE_PREFIX, &upload.file_name)
            .await?;
        self.storage.upload(&key, &upload.data, content_type).await?;
        Ok(key)
    }
}

/// Decode an upload as an image, returning its MIME type.
fn check_image(data: &[u8]) -> Option<&'static str> {
    let format = image::guess_format(data).ok()?;
    image::load_from_memory_with_format(data, format).ok()?;
    Some(format.to_mime_type())
}
