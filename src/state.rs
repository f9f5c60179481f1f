// src/state.rs

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::FromRef;
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::Config;
use crate::models::session::{SessionView, UploadedFileSummary};
use crate::services::llm::{ApiKey, ChatBackend};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub sessions: SessionStore,
    pub chat: Arc<dyn ChatBackend>,
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for SessionStore {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

/// Per-user working context: the uploads seen so far and the credential.
#[derive(Debug)]
pub struct Session {
    pub files: Vec<UploadedFileSummary>,
    /// Every upload's text followed by a newline, in upload order. Only ever appended to.
    pub combined_content: String,
    pub api_key: Option<ApiKey>,
    pub last_seen: DateTime<Utc>,
}

impl Session {
    fn new() -> Self {
        Self {
            files: Vec::new(),
            combined_content: String::new(),
            api_key: None,
            last_seen: Utc::now(),
        }
    }

    pub fn append(&mut self, summary: UploadedFileSummary, text: &str) {
        self.combined_content.push_str(text);
        self.combined_content.push('\n');
        self.files.push(summary);
    }

    pub fn can_analyze(&self) -> bool {
        !self.files.is_empty() && self.api_key.is_some()
    }

    pub fn view(&self, id: Uuid) -> SessionView {
        SessionView {
            session_id: id,
            files: self.files.clone(),
            combined_chars: self.combined_content.chars().count(),
            has_credential: self.api_key.is_some(),
            can_analyze: self.can_analyze(),
        }
    }
}

/// In-memory sessions keyed by id, expiring after an idle TTL.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<Uuid, Session>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.inner.lock().await.insert(id, Session::new());
        id
    }

    /// Runs `f` against a live session, refreshing its idle timer.
    /// Returns `None` if the session is unknown or has expired.
    pub async fn with_session<R>(&self, id: Uuid, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        let mut sessions = self.inner.lock().await;
        let now = Utc::now();

        let expired = sessions
            .get(&id)
            .is_some_and(|s| now - s.last_seen > self.ttl);
        if expired {
            sessions.remove(&id);
            return None;
        }

        let session = sessions.get_mut(&id)?;
        session.last_seen = now;
        Some(f(session))
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.inner.lock().await.remove(&id).is_some()
    }

    /// Drops every session idle for longer than the TTL; returns how many were dropped.
    pub async fn sweep_expired(&self) -> usize {
        let mut sessions = self.inner.lock().await;
        let now = Utc::now();
        let before = sessions.len();
        sessions.retain(|_, s| now - s.last_seen <= self.ttl);
        before - sessions.len()
    }
}
