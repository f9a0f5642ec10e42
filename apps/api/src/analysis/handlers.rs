//! Axum route handlers for the analysis buttons and the chat panel.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::analysis::chat::send_chat;
use crate::analysis::{run_action, Action, ActionOutcome};
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub action: Action,
    #[serde(flatten)]
    pub outcome: ActionOutcome,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub from_model: bool,
    pub history_length: usize,
    pub transcript: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub history_length: usize,
    pub transcript: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

async fn dispatch(
    state: AppState,
    id: Uuid,
    action: Action,
    request: AnalyzeRequest,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let handle = state.sessions.get(id).await?;
    let session = handle.lock().await;

    let outcome = run_action(
        &session,
        action,
        &request.job_description,
        state.generator.as_ref(),
        state.rasterizer.clone(),
        &state.prompts,
    )
    .await?;
    debug!("Session {id}: {:?} answered with {} chars", action, outcome.text().len());

    Ok(Json(AnalyzeResponse { action, outcome }))
}

/// POST /api/v1/sessions/:id/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    dispatch(state, id, Action::Analyze, request).await
}

/// POST /api/v1/sessions/:id/skill-gap
pub async fn handle_skill_gap(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    dispatch(state, id, Action::SkillGap, request).await
}

/// POST /api/v1/sessions/:id/interview-prep
pub async fn handle_interview_prep(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    dispatch(state, id, Action::InterviewPrep, request).await
}

/// POST /api/v1/sessions/:id/chat
pub async fn handle_chat_send(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;

    let outcome = send_chat(
        &mut session,
        &request.message,
        state.generator.as_ref(),
        state.rasterizer.clone(),
    )
    .await?;

    Ok(Json(ChatResponse {
        reply: outcome.reply,
        from_model: outcome.from_model,
        history_length: session.chat_history().len(),
        transcript: session.transcript(),
    }))
}

/// GET /api/v1/sessions/:id/chat
pub async fn handle_chat_transcript(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TranscriptResponse>, AppError> {
    let handle = state.sessions.get(id).await?;
    let session = handle.lock().await;

    Ok(Json(TranscriptResponse {
        history_length: session.chat_history().len(),
        transcript: session.transcript(),
    }))
}
