//! Validation error shared by the model and the ingestion engine.

use thiserror::Error;

/// A rejected write, optionally attributed to one field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}{reason}", field_prefix(.field))]
pub struct ValidationError {
    /// Field name the failure refers to, when there is one.
    pub field: Option<String>,
    pub reason: String,
}

impl ValidationError {
    /// A failure attributed to a single field.
    pub fn field(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: Some(name.into()),
            reason: reason.into(),
        }
    }

    /// A failure about the request or field list as a whole.
    pub fn general(reason: impl Into<String>) -> Self {
        Self {
            field: None,
            reason: reason.into(),
        }
    }
}

fn field_prefix(field: &Option<String>) -> String {
    match field {
        Some(name) => format!("field '{name}': "),
        None => String::new(),
    }
}
