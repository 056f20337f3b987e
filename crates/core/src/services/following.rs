//! Following service.

use sea_orm::Set;
use tracing::{debug, info};
use yatube_common::{AppError, AppResult};
use yatube_db::{
    entities::{follow, user},
    repositories::{FollowRepository, UserRepository},
};

/// Following service for business logic.
#[derive(Clone)]
pub struct FollowingService {
    follow_repo: FollowRepository,
    user_repo: UserRepository,
}

impl FollowingService {
    /// Create a new following service.
    #[must_use]
    pub const fn new(follow_repo: FollowRepository, user_repo: UserRepository) -> Self {
        Self {
            follow_repo,
            user_repo,
        }
    }

    /// Follow the author named `username`.
    ///
    /// Following yourself or someone already followed is a no-op. Returns the
    /// author and whether a new edge was created.
    pub async fn follow(
        &self,
        follower: &user::Model,
        username: &str,
    ) -> AppResult<(user::Model, bool)> {
        let author = self.user_repo.get_by_username(username).await?;

        if author.id == follower.id {
            debug!(user_id = follower.id, "Ignored self-follow");
            return Ok((author, false));
        }

        if self.follow_repo.is_following(follower.id, author.id).await? {
            return Ok((author, false));
        }

        let model = follow::ActiveModel {
            follower_id: Set(follower.id),
            followee_id: Set(author.id),
            ..Default::default()
        };

        match self.follow_repo.create(model).await {
            Ok(_) => {
                info!(follower_id = follower.id, followee_id = author.id, "Followed author");
                Ok((author, true))
            }
            // Lost a race with a concurrent identical request
            Err(AppError::Conflict(_)) => Ok((author, false)),
            Err(e) => Err(e),
        }
    }

    /// Stop following the author named `username`. Missing edges are a no-op.
    pub async fn unfollow(
        &self,
        follower: &user::Model,
        username: &str,
    ) -> AppResult<(user::Model, bool)> {
        let author = self.user_repo.get_by_username(username).await?;
        let removed = self.follow_repo.delete_by_pair(follower.id, author.id).await?;

        if removed {
            info!(follower_id = follower.id, followee_id = author.id, "Unfollowed author");
        }

        Ok((author, removed))
    }

    /// Check if `follower_id` follows `followee_id`.
    pub async fn is_following(&self, follower_id: i32, followee_id: i32) -> AppResult<bool> {
        self.follow_repo.is_following(follower_id, followee_id).await
    }
}
