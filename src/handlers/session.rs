// src/handlers/session.rs

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    error::AppError,
    extract::{DocumentKind, ExtractError, extract},
    models::session::{CreateSessionResponse, SetCredentialRequest, UploadedFileSummary},
    services::llm::ApiKey,
    state::SessionStore,
    utils::text::word_count,
};

/// Opens a fresh session with no uploads and no credential.
pub async fn create_session(
    State(sessions): State<SessionStore>,
) -> Result<impl IntoResponse, AppError> {
    let session_id = sessions.create().await;
    tracing::info!("Session {} created", session_id);

    Ok((StatusCode::CREATED, Json(CreateSessionResponse { session_id })))
}

pub async fn get_session(
    State(sessions): State<SessionStore>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let view = sessions
        .with_session(id, |s| s.view(id))
        .await
        .ok_or_else(AppError::session_not_found)?;

    Ok(Json(view))
}

pub async fn delete_session(
    State(sessions): State<SessionStore>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    if !sessions.remove(id).await {
        return Err(AppError::session_not_found());
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Stores the session's API key in memory. The key is never persisted or logged.
pub async fn set_credential(
    State(sessions): State<SessionStore>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetCredentialRequest>,
) -> Result<impl IntoResponse, AppError> {
    let api_key = ApiKey::new(req.api_key)
        .ok_or_else(|| AppError::BadRequest("API key must not be empty".to_string()))?;

    sessions
        .with_session(id, |s| s.api_key = Some(api_key))
        .await
        .ok_or_else(AppError::session_not_found)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Accepts a multipart batch of files and appends their text to the session.
///
/// * Every field carrying a file name is treated as an upload.
/// * Extraction runs off the async runtime.
/// * The batch is all-or-nothing: one unreadable file rejects the whole upload.
pub async fn upload_files(
    State(sessions): State<SessionStore>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    sessions
        .with_session(id, |_| ())
        .await
        .ok_or_else(AppError::session_not_found)?;

    let mut uploads: Vec<(String, Bytes)> = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        let bytes = field.bytes().await?;
        uploads.push((name, bytes));
    }

    if uploads.is_empty() {
        return Err(AppError::BadRequest("No files in upload".to_string()));
    }

    let extracted = run_extraction(move || extract_batch(uploads)).await?;

    let summaries = sessions
        .with_session(id, |s| {
            for (summary, text) in &extracted {
                s.append(summary.clone(), text);
            }
            extracted
                .iter()
                .map(|(summary, _)| summary.clone())
                .collect::<Vec<_>>()
        })
        .await
        .ok_or_else(AppError::session_not_found)?;

    Ok(Json(summaries))
}

/// Runs a parsing job off the async runtime. A parser panic counts as an unreadable file.
async fn run_extraction<T, F>(job: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, ExtractError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(job).await {
        Ok(result) => Ok(result?),
        Err(e) if e.is_panic() => {
            tracing::warn!("Extraction panicked: {}", e);
            Err(AppError::UnprocessableEntity(
                "uploaded file could not be parsed".to_string(),
            ))
        }
        Err(e) => Err(AppError::InternalServerError(e.to_string())),
    }
}

fn extract_batch(
    uploads: Vec<(String, Bytes)>,
) -> Result<Vec<(UploadedFileSummary, String)>, ExtractError> {
    uploads
        .into_iter()
        .map(|(name, bytes)| {
            tracing::info!("Processing upload `{}` ({} bytes)", name, bytes.len());
            let text = extract(&name, &bytes).inspect_err(|e| {
                tracing::warn!("Failed to extract `{}`: {}", name, e);
            })?;
            let summary = UploadedFileSummary {
                kind: DocumentKind::from_file_name(&name),
                word_count: word_count(&text),
                name,
            };
            tracing::info!(
                "Extracted {} words from `{}`",
                summary.word_count,
                summary.name
            );
            Ok((summary, text))
        })
        .collect()
}
