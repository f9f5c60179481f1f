// src/services/llm.rs

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::LlmSettings;

/// A user-supplied API credential. Held in memory only and never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` for blank input.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// One system/user exchange with an output-length bound.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
}

#[derive(Debug)]
pub enum LlmError {
    /// Transport failure: DNS, connect, timeout, body decode.
    Http(reqwest::Error),
    /// The endpoint answered with a non-success status.
    Status { status: u16, body: String },
    /// The response carried no assistant content.
    EmptyResponse,
    InvalidBaseUrl(String),
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::Http(err) => write!(f, "request failed: {err}"),
            LlmError::Status { status, body } => write!(f, "API error {status}: {body}"),
            LlmError::EmptyResponse => write!(f, "the model returned no content"),
            LlmError::InvalidBaseUrl(msg) => write!(f, "invalid API base URL: {msg}"),
        }
    }
}

impl std::error::Error for LlmError {}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::Http(err)
    }
}

/// A chat-completion provider.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, api_key: &ApiKey, request: &ChatRequest) -> Result<String, LlmError>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Clone)]
pub struct OpenAiChat {
    client: Client,
    endpoint: Url,
    model: String,
}

impl OpenAiChat {
    pub fn new(settings: &LlmSettings) -> Result<Self, LlmError> {
        // `Url::join` replaces the last path segment unless the base ends with '/'.
        let base = format!("{}/", settings.api_base.trim_end_matches('/'));
        let endpoint = Url::parse(&base)
            .and_then(|base| base.join("chat/completions"))
            .map_err(|e| LlmError::InvalidBaseUrl(format!("{}: {e}", settings.api_base)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            model: settings.model.clone(),
        })
    }
}

#[async_trait]
impl ChatBackend for OpenAiChat {
    async fn complete(&self, api_key: &ApiKey, request: &ChatRequest) -> Result<String, LlmError> {
        tracing::debug!(
            model = %self.model,
            max_tokens = request.max_tokens,
            "Calling chat-completion endpoint"
        );

        let payload = ChatCompletionRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            max_tokens: request.max_tokens,
        };

        let res = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(api_key.expose())
            .json(&payload)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            tracing::warn!(status, "Chat-completion endpoint returned an error");
            return Err(LlmError::Status { status, body });
        }

        let body: ChatCompletionResponse = res.json().await?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(LlmError::EmptyResponse)
    }
}
