//! JSON error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use formstack_engine::EngineError;
use serde::Serialize;
use tracing::error;

/// An error as returned to HTTP clients:
/// `{"error": {"kind": .., "field": .., "message": ..}}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    field: Option<String>,
    message: String,
}

impl ApiError {
    /// The request could not be read at all.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: "bad_request",
            field: None,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            kind: "storage",
            field: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Validation(v) => Self {
                status: StatusCode::BAD_REQUEST,
                kind: "validation",
                message: v.reason,
                field: v.field,
            },
            EngineError::NotFound(_) => Self {
                status: StatusCode::NOT_FOUND,
                kind: "not_found",
                field: None,
                message: e.to_string(),
            },
            EngineError::FieldNotFound { ref field_id, .. } => Self {
                status: StatusCode::NOT_FOUND,
                kind: "not_found",
                field: Some(field_id.clone()),
                message: e.to_string(),
            },
            EngineError::Storage(_)
            | EngineError::Blob(_)
            | EngineError::Export(_)
            | EngineError::Io(_)
            | EngineError::Config(_) => {
                error!("Request failed: {}", e);
                Self::internal(e.to_string())
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: ErrorBody<'a>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    kind: &'a str,
    field: Option<&'a str>,
    message: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorEnvelope {
            error: ErrorBody {
                kind: self.kind,
                field: self.field.as_deref(),
                message: &self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}
