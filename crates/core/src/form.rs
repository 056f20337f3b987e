//! Field-level validation errors for submitted forms.

use std::collections::BTreeMap;

use serde::Serialize;

/// Message for a required field left blank.
pub const REQUIRED: &str = "This field is required.";

/// Message for a choice that does not exist.
pub const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// Message for an upload that does not decode as an image.
pub const INVALID_IMAGE: &str = "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

/// Errors keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    /// Create an empty error set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error against a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Whether no errors were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Errors recorded against a field.
    #[must_use]
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[], Vec::as_slice)
    }
}

impl From<validator::ValidationErrors> for FormErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut form = Self::new();
        for (field, errs) in errors.field_errors() {
            for err in errs {
                let message = err
                    .message
                    .as_ref()
                    .map_or_else(|| format!("Invalid value ({}).", err.code), ToString::to_string);
                form.add(field.as_ref(), message);
            }
        }
        form
    }
}

/// Outcome of a form submission.
#[derive(Debug)]
pub enum Submission<T> {
    /// Input was valid and saved.
    Accepted(T),
    /// Input was rejected; nothing was written.
    Rejected(FormErrors),
}
