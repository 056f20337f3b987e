//! Post repository.

use std::sync::Arc;

use crate::entities::{Post, follow, post};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select,
    sea_query::Query,
};
use yatube_common::{AppError, AppResult};

/// Which posts a feed shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    /// Every post on the site.
    All,
    /// Posts published in a group.
    Group(i32),
    /// Posts written by a user.
    Author(i32),
    /// Posts written by anyone the given user follows.
    FollowedBy(i32),
}

impl PostFilter {
    fn apply(self, query: Select<Post>) -> Select<Post> {
        match self {
            Self::All => query,
            Self::Group(group_id) => query.filter(post::Column::GroupId.eq(group_id)),
            Self::Author(author_id) => query.filter(post::Column::AuthorId.eq(author_id)),
            Self::FollowedBy(user_id) => query.filter(
                post::Column::AuthorId.in_subquery(
                    Query::select()
                        .column(follow::Column::FolloweeId)
                        .from(follow::Entity)
                        .and_where(follow::Column::FollowerId.eq(user_id))
                        .to_owned(),
                ),
            ),
        }
    }
}

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i32) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post.
    pub async fn update(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a slice of a feed, newest first.
    ///
    /// Posts sharing a publication time are ordered by descending ID so the
    /// order is stable across pages.
    pub async fn find_feed(
        &self,
        filter: PostFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<post::Model>> {
        filter
            .apply(Post::find())
            .order_by_desc(post::Column::PubDate)
            .order_by_desc(post::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count the posts in a feed.
    pub async fn count_feed(&self, filter: PostFilter) -> AppResult<u64> {
        filter
            .apply(Post::find())
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count the posts written by a user.
    pub async fn count_by_author(&self, author_id: i32) -> AppResult<u64> {
        self.count_feed(PostFilter::Author(author_id)).await
    }
}
