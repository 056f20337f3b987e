//! Display shapes for posts and comments.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use yatube_common::{AppResult, StorageBackend};
use yatube_db::{
    entities::{comment, group, post, user},
    repositories::{GroupRepository, UserRepository},
};

/// Public view of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorView {
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
}

impl From<&user::Model> for AuthorView {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            full_name: user.full_name(),
        }
    }
}

/// A post with its author, group and image URL resolved.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: post::Model,
    pub author: AuthorView,
    pub group: Option<group::Model>,
    pub image_url: Option<String>,
}

/// A comment with its author resolved.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: comment::Model,
    pub author: AuthorView,
}

/// Resolves related rows for lists of posts and comments in batches.
#[derive(Clone)]
pub struct PostPresenter {
    user_repo: UserRepository,
    group_repo: GroupRepository,
    storage: Arc<dyn StorageBackend>,
}

impl PostPresenter {
    /// Create a new presenter.
    #[must_use]
    pub fn new(
        user_repo: UserRepository,
        group_repo: GroupRepository,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            user_repo,
            group_repo,
            storage,
        }
    }

    /// Resolve authors, groups and image URLs, keeping the input order.
    pub async fn posts(&self, posts: Vec<post::Model>) -> AppResult<Vec<PostView>> {
        let authors = self
            .authors(posts.iter().map(|p| p.author_id).collect())
            .await?;

        let mut group_ids: Vec<i32> = posts.iter().filter_map(|p| p.group_id).collect();
        group_ids.sort_unstable();
        group_ids.dedup();
        let groups: HashMap<i32, group::Model> = self
            .group_repo
            .find_by_ids(&group_ids)
            .await?
            .into_iter()
            .map(|g| (g.id, g))
            .collect();

        Ok(posts
            .into_iter()
            .filter_map(|post| {
                let Some(author) = authors.get(&post.author_id) else {
                    tracing::warn!(post_id = post.id, "Post author missing, skipping");
                    return None;
                };
                let group = post.group_id.and_then(|id| groups.get(&id).cloned());
                let image_url = post.image.as_deref().map(|key| self.storage.public_url(key));
                Some(PostView {
                    author: author.clone(),
                    group,
                    image_url,
                    post,
                })
            })
            .collect())
    }

    /// Resolve a single post.
    pub async fn post(&self, post: post::Model) -> AppResult<Option<PostView>> {
        Ok(self.posts(vec![post]).await?.into_iter().next())
    }

    /// Resolve comment authors, keeping the input order.
    pub async fn comments(&self, comments: Vec<comment::Model>) -> AppResult<Vec<CommentView>> {
        let authors = self
            .authors(comments.iter().map(|c| c.author_id).collect())
            .await?;

        Ok(comments
            .into_iter()
            .filter_map(|comment| {
                authors.get(&comment.author_id).cloned().map(|author| CommentView {
                    comment,
                    author,
                })
            })
            .collect())
    }

    async fn authors(&self, mut ids: Vec<i32>) -> AppResult<HashMap<i32, AuthorView>> {
        ids.sort_unstable();
        ids.dedup();
        Ok(self
            .user_repo
            .find_by_ids(&ids)
            .await?
            .iter()
            .map(|u| (u.id, AuthorView::from(u)))
            .collect())
    }
}
