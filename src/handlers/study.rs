// src/handlers/study.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db,
    error::AppError,
    models::{
        exam_result::{GenerateExamRequest, GenerateExamResponse},
        session::VerifyResponse,
    },
    services::{llm::ApiKey, study},
    state::{AppState, Session},
};

/// Inputs for a model call, cloned out so the session lock is released before the call.
/// Refuses when nothing has been uploaded yet or no credential was provided.
fn analysis_inputs(session: &Session) -> Result<(String, ApiKey), AppError> {
    if session.files.is_empty() {
        return Err(AppError::Conflict(
            "Upload at least one file before analyzing content".to_string(),
        ));
    }

    let api_key = session.api_key.clone().ok_or_else(|| {
        AppError::BadRequest(format!(
            "{} An API key is required before analyzing content",
            study::WARNING_MARKER
        ))
    })?;

    Ok((session.combined_content.clone(), api_key))
}

/// Grades the scientific accuracy of everything uploaded in the session so far.
pub async fn verify_content(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (content, api_key) = state
        .sessions
        .with_session(id, |s| analysis_inputs(s))
        .await
        .ok_or_else(AppError::session_not_found)??;

    tracing::info!("Verifying content for session {}", id);
    let assessment = study::verify(
        state.chat.as_ref(),
        &api_key,
        &state.config.prompts,
        &content,
    )
    .await;

    Ok(Json(VerifyResponse { assessment }))
}

/// Generates an exam from the session's content and records it in the progress history.
///
/// The record is written even when the model call failed and `questions`
/// holds a warning instead.
pub async fn generate_exam(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<GenerateExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let (content, api_key) = state
        .sessions
        .with_session(id, |s| analysis_inputs(s))
        .await
        .ok_or_else(AppError::session_not_found)??;

    tracing::info!(
        "Generating {} {:?} questions for session {}",
        req.count,
        req.difficulty,
        id
    );
    let questions = study::generate(
        state.chat.as_ref(),
        &api_key,
        &state.config.prompts,
        &content,
        req.difficulty,
        req.count,
    )
    .await;

    let record = db::record_exam(&state.pool, req.difficulty.label(), i64::from(req.count))
        .await
        .map_err(|e| {
            tracing::error!("Failed to record exam result: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    Ok(Json(GenerateExamResponse {
        questions,
        record: record.into(),
    }))
}
