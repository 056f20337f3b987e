//! Static informational pages.

use axum::{Router, extract::State, routing::get};
use serde_json::json;
use yatube_common::AppResult;

use crate::{middleware::AppState, response::RenderedPage};

async fn author(State(state): State<AppState>) -> AppResult<RenderedPage> {
    RenderedPage::render(state.renderer.as_ref(), "about/author.html", json!({}))
}

async fn tech(State(state): State<AppState>) -> AppResult<RenderedPage> {
    RenderedPage::render(state.renderer.as_ref(), "about/tech.html", json!({}))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/author/", get(author))
        .route("/tech/", get(tech))
}
