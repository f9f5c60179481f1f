// src/models/session.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::extract::DocumentKind;

/// What the client learns about one extracted upload.
#[derive(Debug, Clone, Serialize)]
pub struct UploadedFileSummary {
    pub name: String,
    pub kind: DocumentKind,
    pub word_count: usize,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
}

/// Snapshot of a session. `can_analyze` gates the verify and exam actions.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub files: Vec<UploadedFileSummary>,
    pub combined_chars: usize,
    pub has_credential: bool,
    pub can_analyze: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetCredentialRequest {
    pub api_key: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub assessment: String,
}
