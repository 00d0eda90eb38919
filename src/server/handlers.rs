use super::views::{IndexTemplate, ResultsTemplate};
use super::AppState;
use crate::convert::process_batch;
use crate::error::DocReaderError;
use crate::output::{BatchReport, UploadedFile};
use askama::Template;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error};

/// Multipart field names that carry uploads.
const FILE_FIELDS: &[&str] = &["files", "file"];

/// HTTP wrapper for [`DocReaderError`].
pub struct ApiError(DocReaderError);

impl From<DocReaderError> for ApiError {
    fn from(e: DocReaderError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DocReaderError::MalformedUpload(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("{}", self.0);
        } else {
            debug!("{}", self.0);
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

fn render<T: Template>(template: &T) -> Result<Html<String>, ApiError> {
    template
        .render()
        .map(Html)
        .map_err(|e| ApiError(DocReaderError::Internal(format!("template: {e}"))))
}

/// Collect every uploaded file from a multipart body, in order.
///
/// Empty parts without a file name (an untouched file input) are skipped.
pub async fn extract_uploads(mut multipart: Multipart) -> Result<Vec<UploadedFile>, DocReaderError> {
    let mut uploads = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| DocReaderError::MalformedUpload(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        if !FILE_FIELDS.contains(&field_name.as_str()) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(|e| {
            DocReaderError::MalformedUpload(format!("Failed to read file data: {}", e))
        })?;

        if file_name.is_empty() && data.is_empty() {
            continue;
        }

        let size = data.len() as u64;
        uploads.push(UploadedFile::new(file_name, data.to_vec()).with_declared_size(size));
    }

    Ok(uploads)
}

async fn run(state: &AppState, multipart: Multipart) -> Result<BatchReport, ApiError> {
    let uploads = extract_uploads(multipart).await?;
    Ok(process_batch(uploads, &state.engine, &state.config).await)
}

pub async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    render(&IndexTemplate::new(&state))
}

pub async fn convert_page(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Html<String>, ApiError> {
    let report = run(&state, multipart).await?;
    render(&ResultsTemplate::new(&state, &report))
}

pub async fn convert_json(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<BatchReport>, ApiError> {
    Ok(Json(run(&state, multipart).await?))
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "engine": state.engine.name(),
        "engine_ready": state.engine_error.is_none(),
    }))
}
