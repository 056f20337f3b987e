//! Post form extraction from multipart or urlencoded bodies.

use axum::{
    Form,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};
use serde::Deserialize;
use yatube_common::AppError;
use yatube_core::{ImageUpload, PostInput};

/// A submitted post form.
#[derive(Debug)]
pub struct PostForm(pub PostInput);

#[derive(Debug, Deserialize)]
struct UrlencodedPost {
    #[serde(default)]
    text: String,
    #[serde(default)]
    group: Option<String>,
}

impl<S> FromRequest<S> for PostForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("multipart/form-data"));

        if !is_multipart {
            let Form(form) = Form::<UrlencodedPost>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            return Ok(Self(PostInput {
                text: form.text,
                group: form.group,
                image: None,
            }));
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        let mut input = PostInput::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "text" => {
                    input.text = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.body_text()))?;
                }
                "group" => {
                    input.group = Some(
                        field
                            .text()
                            .await
                            .map_err(|e| AppError::BadRequest(e.body_text()))?,
                    );
                }
                "image" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.body_text()))?;
                    // Browsers send an empty part when no file was chosen
                    if !(file_name.is_empty() && data.is_empty()) {
                        input.image = Some(ImageUpload {
                            file_name,
                            data: data.to_vec(),
                        });
                    }
                }
                other => tracing::debug!(field = %other, "Ignoring unknown form field"),
            }
        }

        Ok(Self(input))
    }
}
