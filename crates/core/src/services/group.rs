//! Group service.

use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use validator::Validate;
use yatube_common::{AppError, AppResult};
use yatube_db::{entities::group, repositories::GroupRepository};

use crate::slug::{is_valid_slug, slugify};

/// Input for creating a group.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGroupInput {
    #[validate(length(min = 1, max = 100))]
    pub title: String,

    /// Explicit slug; derived from the title when absent or blank.
    #[serde(default)]
    #[validate(length(max = 50))]
    pub slug: Option<String>,

    #[serde(default)]
    #[validate(length(max = 300))]
    pub description: String,
}

/// Group service for business logic.
#[derive(Clone)]
pub struct GroupService {
    group_repo: GroupRepository,
}

impl GroupService {
    /// Create a new group service.
    #[must_use]
    pub const fn new(group_repo: GroupRepository) -> Self {
        Self { group_repo }
    }

    /// Create a group. A slug collision is a [`AppError::Conflict`].
    pub async fn create(&self, input: CreateGroupInput) -> AppResult<group::Model> {
        input.validate()?;

        let slug = match input.slug.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => {
                if !is_valid_slug(slug) {
                    return Err(AppError::Validation(format!(
                        "slug: '{slug}' may only contain latin letters, digits, hyphens and underscores"
                    )));
                }
                slug.to_string()
            }
            _ => slugify(&input.title),
        };

        if slug.is_empty() {
            return Err(AppError::Validation(format!(
                "slug: cannot derive a slug from '{}'",
                input.title
            )));
        }

        let model = group::ActiveModel {
            title: Set(input.title),
            slug: Set(slug),
            description: Set(input.description),
            ..Default::default()
        };

        let group = self.group_repo.create(model).await?;
        info!(group_id = group.id, slug = %group.slug, group = %group, "Created group");

        Ok(group)
    }

    /// Get a group by slug.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<group::Model> {
        self.group_repo.get_by_slug(slug).await
    }

    /// All groups, for form choices.
    pub async fn list(&self) -> AppResult<Vec<group::Model>> {
        self.group_repo.find_all().await
    }
}
