//! Business logic services.

#![allow(missing_docs)]

pub mod comment;
pub mod feed;
pub mod following;
pub mod group;
pub mod post;
pub mod presenter;
pub mod user;

pub use comment::{CommentInput, CommentService};
pub use feed::{FeedService, GroupFeed, ProfileFeed};
pub use following::FollowingService;
pub use group::{CreateGroupInput, GroupService};
pub use post::{ImageUpload, PostDetail, PostInput, PostService};
pub use presenter::{AuthorView, CommentView, PostPresenter, PostView};
pub use user::{SignupInput, UserService};
