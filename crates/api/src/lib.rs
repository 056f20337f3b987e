//! HTTP layer for yatube-rs.
//!
//! - **Endpoints**: feeds, post pages, profiles, accounts and admin actions
//! - **Extractors**: session user, login-required redirects, post forms
//! - **Middleware**: session resolution from cookie or bearer token
//! - **Rendering**: page output through a pluggable [`Renderer`]
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod forms;
pub mod middleware;
pub mod response;

pub use endpoints::{app, router};
pub use middleware::AppState;
pub use response::{JsonRenderer, Renderer};
