//! HTTP API for formstack.
//!
//! Every route lives under `/api/v1`. Engine calls are blocking and run on
//! tokio's blocking pool.

pub mod config;
mod error;
mod payload;

pub use error::ApiError;
pub use payload::RecordPayload;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json};
use axum::routing::{get, patch, post};
use axum::Router;
use formstack_engine::{EncodedRecord, EngineResult, RecordStore, RecordView};
use formstack_model::{FieldConfig, FieldPatch, FormType, RecordId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::DEFAULT_MAX_BODY_BYTES;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    records: Arc<RecordStore>,
    max_body_bytes: usize,
}

impl AppState {
    pub fn new(records: RecordStore) -> Self {
        Self {
            records: Arc::new(records),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    #[must_use]
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    #[must_use]
    pub fn records(&self) -> &Arc<RecordStore> {
        &self.records
    }
}

/// `{"data": ...}` envelope used by list and field endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    #[serde(default)]
    pub view: RecordView,
}

/// Build the HTTP API router.
pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_body_bytes);
    Router::new()
        .route("/api/v1/records", post(create_record))
        .route(
            "/api/v1/records/{id}",
            get(get_record).put(replace_record).delete(delete_record),
        )
        .route("/api/v1/records/type/{form_type}", get(list_records))
        .route("/api/v1/records/type/{form_type}/export", get(export_records))
        .route("/api/v1/fields/{form_type}", get(get_fields).put(set_fields))
        .route("/api/v1/fields/{form_type}/{field_id}", patch(update_field))
        .layer(body_limit)
        .with_state(state)
}

/// Runs a blocking engine call off the async runtime.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> EngineResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::internal(format!("worker task failed: {e}")))?
        .map_err(ApiError::from)
}

fn parse_form_type(raw: &str) -> Result<FormType, ApiError> {
    FormType::new(raw).map_err(|e| ApiError::bad_request(e.to_string()))
}

fn parse_record_id(raw: &str) -> Result<RecordId, ApiError> {
    RecordId::parse(raw).map_err(|e| ApiError::bad_request(e.to_string()))
}

async fn create_record(
    State(state): State<AppState>,
    RecordPayload(request): RecordPayload,
) -> Result<(StatusCode, Json<EncodedRecord>), ApiError> {
    let form_type = request
        .form_type()
        .ok_or_else(|| ApiError::bad_request("formType is required"))
        .and_then(parse_form_type)?;
    debug!(
        "POST record of type {} ({} field(s), {} file(s))",
        form_type,
        request.fields().len(),
        request.files().len()
    );

    let records = state.records.clone();
    let encoded = blocking(move || {
        let record = records.create(&form_type, &request)?;
        Ok(records.encode(&record, RecordView::Raw))
    })
    .await?;
    Ok((StatusCode::CREATED, Json(encoded)))
}

async fn replace_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    RecordPayload(request): RecordPayload,
) -> Result<Json<EncodedRecord>, ApiError> {
    let id = parse_record_id(&id)?;
    debug!("PUT record {}", id);

    let records = state.records.clone();
    let encoded = blocking(move || {
        let record = records.replace(&id, &request)?;
        Ok(records.encode(&record, RecordView::Raw))
    })
    .await?;
    Ok(Json(encoded))
}

async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: Result<Query<ViewQuery>, QueryRejection>,
) -> Result<Json<EncodedRecord>, ApiError> {
    let id = parse_record_id(&id)?;
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let records = state.records.clone();
    let encoded = blocking(move || {
        let record = records.get(&id)?;
        Ok(records.encode(&record, query.view))
    })
    .await?;
    Ok(Json(encoded))
}

async fn list_records(
    State(state): State<AppState>,
    Path(form_type): Path<String>,
    query: Result<Query<ViewQuery>, QueryRejection>,
) -> Result<Json<DataResponse<Vec<EncodedRecord>>>, ApiError> {
    let form_type = parse_form_type(&form_type)?;
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let records = state.records.clone();
    let data = blocking(move || {
        let listed = records.list_by_type(&form_type)?;
        Ok(listed
            .iter()
            .map(|record| records.encode(record, query.view))
            .collect::<Vec<_>>())
    })
    .await?;
    Ok(Json(DataResponse { data }))
}

async fn delete_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let id = parse_record_id(&id)?;
    let records = state.records.clone();
    blocking(move || records.delete_by_id(&id)).await?;
    info!("DELETE record {}", id);
    Ok(Json(SuccessResponse { success: true }))
}

async fn export_records(
    State(state): State<AppState>,
    Path(form_type): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let form_type = parse_form_type(&form_type)?;
    let disposition = format!("attachment; filename=\"{form_type}.csv\"");
    let records = state.records.clone();
    let csv = blocking(move || records.export_csv(&form_type)).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}

async fn get_fields(
    State(state): State<AppState>,
    Path(form_type): Path<String>,
) -> Result<Json<DataResponse<Vec<FieldConfig>>>, ApiError> {
    let form_type = parse_form_type(&form_type)?;
    let data = state.records.registry().get_fields(&form_type);
    Ok(Json(DataResponse { data }))
}

async fn set_fields(
    State(state): State<AppState>,
    Path(form_type): Path<String>,
    body: Result<Json<Vec<FieldConfig>>, JsonRejection>,
) -> Result<Json<DataResponse<Vec<FieldConfig>>>, ApiError> {
    let form_type = parse_form_type(&form_type)?;
    let Json(fields) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let registry = state.records.registry().clone();
    let data = blocking(move || {
        registry.set_fields(&form_type, fields)?;
        Ok(registry.get_fields(&form_type))
    })
    .await?;
    Ok(Json(DataResponse { data }))
}

async fn update_field(
    State(state): State<AppState>,
    Path((form_type, field_id)): Path<(String, String)>,
    body: Result<Json<FieldPatch>, JsonRejection>,
) -> Result<Json<DataResponse<FieldConfig>>, ApiError> {
    let form_type = parse_form_type(&form_type)?;
    let Json(field_patch) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let registry = state.records.registry().clone();
    let data =
        blocking(move || registry.update_field(&form_type, &field_id, &field_patch)).await?;
    Ok(Json(DataResponse { data }))
}
