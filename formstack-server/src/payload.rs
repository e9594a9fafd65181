//! Reads record requests from multipart forms or JSON objects.

use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::Json;
use formstack_engine::{RawRequest, UploadedFile};
use serde_json::{Map, Value};

use crate::ApiError;

/// A record request body, reduced to text fields and uploaded files.
///
/// `multipart/form-data` bodies keep their parts in order: parts with a
/// filename become uploads, everything else a text field. Any other body is
/// parsed as a JSON object whose scalar members become text fields.
#[derive(Debug)]
pub struct RecordPayload(pub RawRequest);

impl<S> FromRequest<S> for RecordPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            read_multipart(multipart).await.map(Self)
        } else {
            let Json(body) = Json::<Map<String, Value>>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            from_json(body).map(Self)
        }
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<RawRequest, ApiError> {
    let mut request = RawRequest::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match field.file_name().map(str::to_string) {
            Some(filename) => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(e.body_text()))?;
                // Browsers send an empty, unnamed part for an untouched file input.
                if filename.is_empty() && bytes.is_empty() {
                    continue;
                }
                request.push_file(UploadedFile {
                    slot: name,
                    filename,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            None => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.body_text()))?;
                request.push_field(name, text);
            }
        }
    }
    Ok(request)
}

fn from_json(body: Map<String, Value>) -> Result<RawRequest, ApiError> {
    let mut request = RawRequest::new();
    for (name, value) in body {
        let text = match value {
            Value::Null => continue,
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Array(_) | Value::Object(_) => {
                return Err(ApiError::bad_request(format!(
                    "member '{name}' must be a string, number or boolean"
                )));
            }
        };
        request.push_field(name, text);
    }
    Ok(request)
}
