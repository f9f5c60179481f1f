// src/services/study.rs

//! The two model-backed study operations: accuracy review and exam generation.
//! Both are fail-soft: the caller always receives displayable text.

use crate::{
    config::PromptSettings,
    models::exam_result::Difficulty,
    services::llm::{ApiKey, ChatBackend, ChatRequest},
    utils::text::truncate_chars,
};

/// Prefix of every error string produced in place of a model response.
pub const WARNING_MARKER: &str = "⚠️";

pub const VERIFY_PERSONA: &str = "Eres un médico docente preciso y claro.";
pub const GENERATE_PERSONA: &str = "Eres un profesor de medicina que formula preguntas didácticas.";

pub fn build_verify_prompt(content: &str, max_chars: usize) -> String {
    format!(
        r#"
Eres un profesor de medicina. Evalúa la precisión científica del siguiente texto:
---
{}
---
Devuelve un resumen con:
1. Nivel de corrección (Correcto, Parcial o Incorrecto)
2. Breve explicación (máx 2 líneas)
3. Referencia o corrección sugerida.
"#,
        truncate_chars(content, max_chars)
    )
}

pub fn build_generate_prompt(
    content: &str,
    difficulty: Difficulty,
    count: u32,
    max_chars: usize,
) -> String {
    format!(
        r#"
Crea {count} preguntas tipo MIR/USMLE sobre el siguiente contenido:
---
{}
---
Nivel: {}
Cada pregunta debe incluir:
- Enunciado claro
- 4 opciones (A–D)
- Una respuesta correcta
- Explicación breve y colorida
Formato:
PREGUNTA: ...
A) ...
B) ...
C) ...
D) ...
RESPUESTA: ...
EXPLICACIÓN: ...
"#,
        truncate_chars(content, max_chars),
        difficulty.prompt_description()
    )
}

/// Asks the model to grade the scientific accuracy of `content`.
pub async fn verify(
    backend: &dyn ChatBackend,
    api_key: &ApiKey,
    settings: &PromptSettings,
    content: &str,
) -> String {
    let request = ChatRequest {
        system: VERIFY_PERSONA.to_string(),
        user: build_verify_prompt(content, settings.verify_max_chars),
        max_tokens: settings.verify_max_tokens,
    };

    match backend.complete(api_key, &request).await {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            tracing::warn!("Verification call failed: {}", e);
            format!("{WARNING_MARKER} Error al verificar: {e}")
        }
    }
}

/// Asks the model for `count` multiple-choice questions. The reply is returned verbatim.
pub async fn generate(
    backend: &dyn ChatBackend,
    api_key: &ApiKey,
    settings: &PromptSettings,
    content: &str,
    difficulty: Difficulty,
    count: u32,
) -> String {
    let request = ChatRequest {
        system: GENERATE_PERSONA.to_string(),
        user: build_generate_prompt(content, difficulty, count, settings.generate_max_chars),
        max_tokens: settings.generate_max_tokens,
    };

    match backend.complete(api_key, &request).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Question generation call failed: {}", e);
            format!("{WARNING_MARKER} Error al generar preguntas: {e}")
        }
    }
}
