// src/config.rs

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use dotenvy::dotenv;

/// Character caps and output-token budgets for the two prompt templates.
#[derive(Debug, Clone)]
pub struct PromptSettings {
    pub verify_max_chars: usize,
    pub verify_max_tokens: u32,
    pub generate_max_chars: usize,
    pub generate_max_tokens: u32,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            verify_max_chars: 2000,
            verify_max_tokens: 300,
            generate_max_chars: 2500,
            generate_max_tokens: 1200,
        }
    }
}

/// Chat-completion endpoint settings. The API key is per session and lives elsewhere.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_base: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4-turbo".to_string(),
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
    pub bind_addr: SocketAddr,
    pub log_dir: String,
    pub llm: LlmSettings,
    pub prompts: PromptSettings,
    pub max_upload_bytes: usize,
    pub session_ttl_secs: i64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://data/resultados_medstudyflow.db".to_string());

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());

        let llm_defaults = LlmSettings::default();
        let llm = LlmSettings {
            api_base: env::var("LLM_API_BASE").unwrap_or(llm_defaults.api_base),
            model: env::var("LLM_MODEL").unwrap_or(llm_defaults.model),
            timeout_secs: parse_var("LLM_TIMEOUT_SECS", llm_defaults.timeout_secs),
        };

        let prompt_defaults = PromptSettings::default();
        let prompts = PromptSettings {
            verify_max_chars: parse_var("VERIFY_MAX_CHARS", prompt_defaults.verify_max_chars),
            verify_max_tokens: parse_var("VERIFY_MAX_TOKENS", prompt_defaults.verify_max_tokens),
            generate_max_chars: parse_var(
                "GENERATE_MAX_CHARS",
                prompt_defaults.generate_max_chars,
            ),
            generate_max_tokens: parse_var(
                "GENERATE_MAX_TOKENS",
                prompt_defaults.generate_max_tokens,
            ),
        };

        Self {
            database_url,
            rust_log,
            bind_addr: parse_var("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000))),
            log_dir,
            llm,
            prompts,
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", 200 * 1024 * 1024),
            session_ttl_secs: parse_var("SESSION_TTL_SECS", 3600),
        }
    }
}

/// Reads an optional variable, falling back to `default` when unset.
/// A value that is present but malformed is a startup error.
fn parse_var<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{key} has an invalid value: {raw:?}")),
        Err(_) => default,
    }
}
