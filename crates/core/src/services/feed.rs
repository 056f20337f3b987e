//! Feed service: the paginated, newest-first post listings.

use serde::Serialize;
use yatube_common::AppResult;
use yatube_db::{
    entities::{group, user},
    repositories::{FollowRepository, GroupRepository, PostFilter, PostRepository, UserRepository},
};

use crate::pagination::{Page, PageWindow};
use crate::services::presenter::{AuthorView, PostPresenter, PostView};

/// A group with one page of its posts.
#[derive(Debug, Clone, Serialize)]
pub struct GroupFeed {
    pub group: group::Model,
    pub page_obj: Page<PostView>,
}

/// An author with one page of their posts.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileFeed {
    pub author: AuthorView,
    pub full_name: String,
    pub posts_count: u64,
    /// Whether the viewer follows this author; false for anonymous viewers.
    pub following: bool,
    pub page_obj: Page<PostView>,
}

/// Feed service for read paths.
#[derive(Clone)]
pub struct FeedService {
    post_repo: PostRepository,
    user_repo: UserRepository,
    group_repo: GroupRepository,
    follow_repo: FollowRepository,
    presenter: PostPresenter,
}

impl FeedService {
    /// Create a new feed service.
    #[must_use]
    pub const fn new(
        post_repo: PostRepository,
        user_repo: UserRepository,
        group_repo: GroupRepository,
        follow_repo: FollowRepository,
        presenter: PostPresenter,
    ) -> Self {
        Self {
            post_repo,
            user_repo,
            group_repo,
            follow_repo,
            presenter,
        }
    }

    /// Fetch one page of a feed. `requested` is the raw `page` query value.
    pub async fn page(
        &self,
        filter: PostFilter,
        requested: Option<&str>,
    ) -> AppResult<Page<PostView>> {
        let count = self.post_repo.count_feed(filter).await?;
        let window = PageWindow::resolve(requested, count);
        let posts = self
            .post_repo
            .find_feed(filter, window.limit(), window.offset())
            .await?;

        Ok(Page::new(window, self.presenter.posts(posts).await?))
    }

    /// Every post on the site.
    pub async fn index(&self, requested: Option<&str>) -> AppResult<Page<PostView>> {
        self.page(PostFilter::All, requested).await
    }

    /// Posts in the group with `slug`.
    pub async fn group(&self, slug: &str, requested: Option<&str>) -> AppResult<GroupFeed> {
        let group = self.group_repo.get_by_slug(slug).await?;
        let page_obj = self.page(PostFilter::Group(group.id), requested).await?;
        Ok(GroupFeed { group, page_obj })
    }

    /// Posts by the user named `username`.
    pub async fn profile(
        &self,
        username: &str,
        requested: Option<&str>,
        viewer: Option<&user::Model>,
    ) -> AppResult<ProfileFeed> {
        let author = self.user_repo.get_by_username(username).await?;
        let page_obj = self.page(PostFilter::Author(author.id), requested).await?;

        let following = match viewer {
            Some(viewer) => self.follow_repo.is_following(viewer.id, author.id).await?,
            None => false,
        };

        Ok(ProfileFeed {
            full_name: author.full_name(),
            author: AuthorView::from(&author),
            posts_count: page_obj.count,
            following,
            page_obj,
        })
    }

    /// Posts by every author `viewer_id` follows.
    pub async fn follow(&self, viewer_id: i32, requested: Option<&str>) -> AppResult<Page<PostView>> {
        self.page(PostFilter::FollowedBy(viewer_id), requested).await
    }
}
