use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::analysis::prompts::UPLOAD_SUCCESS_MESSAGE;
use crate::document::{looks_like_pdf, UploadedDocument};
use crate::errors::AppError;
use crate::state::AppState;

const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub has_document: bool,
    pub document_name: Option<String>,
    pub document_size_bytes: Option<usize>,
    pub history_length: usize,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub file_name: String,
    pub size_bytes: usize,
}

/// Oversized bodies become 413 naming the limit; anything else is a bad request.
fn multipart_error(err: MultipartError, limit: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("upload exceeds the {limit} byte limit"))
    } else {
        AppError::Validation(format!("Invalid multipart body: {}", err.body_text()))
    }
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<CreateSessionResponse>) {
    let session_id = state.sessions.create().await;
    (StatusCode::CREATED, Json(CreateSessionResponse { session_id }))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSummary>, AppError> {
    let handle = state.sessions.get(id).await?;
    let session = handle.lock().await;

    Ok(Json(SessionSummary {
        session_id: session.id,
        created_at: session.created_at,
        has_document: session.has_document(),
        document_name: session.document.as_ref().map(|d| d.file_name.clone()),
        document_size_bytes: session.document.as_ref().map(|d| d.size()),
        history_length: session.chat_history().len(),
    }))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/document
///
/// Multipart upload, field `file`. Only PDFs are accepted; a new upload
/// replaces the previous one.
pub async fn handle_upload_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let handle = state.sessions.get(id).await?;

    let mut upload: Option<UploadedDocument> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, state.max_upload_bytes))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("resume.pdf").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, state.max_upload_bytes))?;

        upload = Some(UploadedDocument {
            file_name,
            content_type,
            bytes,
        });
    }

    let document = upload.ok_or_else(|| {
        AppError::Validation(format!("multipart field '{UPLOAD_FIELD}' is required"))
    })?;

    if document.bytes.is_empty() {
        return Err(AppError::Validation("uploaded file is empty".to_string()));
    }
    if !looks_like_pdf(&document.bytes, document.content_type.as_deref()) {
        return Err(AppError::Validation(
            "only PDF uploads are accepted".to_string(),
        ));
    }

    let response = UploadResponse {
        message: UPLOAD_SUCCESS_MESSAGE.to_string(),
        file_name: document.file_name.clone(),
        size_bytes: document.size(),
    };

    handle.lock().await.attach_document(document);
    info!(
        "Session {id}: stored '{}' ({} bytes)",
        response.file_name, response.size_bytes
    );

    Ok(Json(response))
}
