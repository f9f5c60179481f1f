// src/handlers/progress.rs

use axum::{Json, extract::State, response::IntoResponse};
use sqlx::SqlitePool;

use crate::{db, error::AppError, models::exam_result::ExamResultView};

/// Lists every recorded exam in insertion order, with the derived percentage.
pub async fn list_results(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let results = db::list_results(&pool).await.map_err(|e| {
        tracing::error!("Failed to fetch exam history: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let history: Vec<ExamResultView> = results.into_iter().map(Into::into).collect();

    Ok(Json(history))
}
