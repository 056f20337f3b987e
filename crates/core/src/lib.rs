//! Core business logic for yatube-rs.
//!
//! - [`slug`]: URL slug derivation for groups
//! - [`pagination`]: fixed-size page windows over feeds
//! - [`page_cache`]: time-boxed cache for rendered pages
//! - [`form`]: field-level validation errors for submitted forms
//! - [`services`]: feeds, posting, comments, following and accounts

pub mod form;
pub mod page_cache;
pub mod pagination;
pub mod services;
pub mod slug;

pub use form::{FormErrors, Submission};
pub use page_cache::{MemoryPageCache, PageCache, RedisPageCache};
pub use pagination::{PAGE_SIZE, Page, PageWindow};
pub use services::*;
