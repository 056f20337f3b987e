//! Page rendering and redirects.

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Datelike;
use serde_json::{Value, json};
use yatube_common::{AppError, AppResult};

/// Turns a template name and context into a response body.
pub trait Renderer: Send + Sync {
    /// Render `template` with `context`.
    fn render(&self, template: &str, context: &Value) -> AppResult<String>;

    /// Content type of rendered bodies.
    fn content_type(&self) -> &'static str;
}

/// Renders `{"template": ..., "context": ...}` documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, template: &str, context: &Value) -> AppResult<String> {
        serde_json::to_string(&json!({
            "template": template,
            "context": context,
        }))
        .map_err(|e| AppError::Internal(format!("Failed to render {template}: {e}")))
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }
}

/// A rendered page body.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub body: String,
    pub content_type: &'static str,
}

impl RenderedPage {
    /// Render `template`; the current year is added to every context.
    pub fn render(renderer: &dyn Renderer, template: &str, mut context: Value) -> AppResult<Self> {
        if let Value::Object(map) = &mut context {
            map.insert("year".to_string(), json!(chrono::Utc::now().year()));
        }

        Ok(Self {
            body: renderer.render(template, &context)?,
            content_type: renderer.content_type(),
        })
    }
}

impl IntoResponse for RenderedPage {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, self.content_type)],
            self.body,
        )
            .into_response()
    }
}

/// `302 Found` redirect to `location`.
#[must_use]
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Serialize a context fragment.
pub fn to_context<T: serde::Serialize>(value: &T) -> AppResult<Value> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(format!("Bad context: {e}")))
}
