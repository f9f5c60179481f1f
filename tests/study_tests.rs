// tests/study_tests.rs

use std::sync::{Arc, Mutex};

use axum::{Json, Router, extract::State, http::HeaderMap, http::StatusCode, routing::post};
use serde_json::{Value, json};
use studyflow::{
    config::{LlmSettings, PromptSettings},
    models::exam_result::Difficulty,
    services::{
        llm::{ApiKey, ChatBackend, ChatRequest, LlmError, OpenAiChat},
        study,
    },
};

type Seen = Arc<Mutex<Vec<(Option<String>, Value)>>>;

/// Spawns a stand-in for the chat-completion API that answers with `status` and `reply`.
async fn spawn_fake_api(status: StatusCode, reply: Value) -> (String, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));

    let app = Router::new()
        .route(
            "/v1/chat/completions",
            post(
                move |State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>| {
                    let reply = reply.clone();
                    async move {
                        let auth = headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        seen.lock().unwrap().push((auth, body));
                        (status, Json(reply))
                    }
                },
            ),
        )
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://127.0.0.1:{}/v1", port), seen)
}

fn client_for(api_base: &str) -> OpenAiChat {
    OpenAiChat::new(&LlmSettings {
        api_base: api_base.to_string(),
        model: "gpt-4-turbo".to_string(),
        timeout_secs: 5,
    })
    .unwrap()
}

fn key() -> ApiKey {
    ApiKey::new("sk-test").unwrap()
}

#[test]
fn verify_prompt_caps_content_by_characters() {
    let content = "ß".repeat(2100);

    let prompt = study::build_verify_prompt(&content, 2000);

    assert_eq!(prompt.matches('ß').count(), 2000);
    assert!(prompt.contains("Nivel de corrección (Correcto, Parcial o Incorrecto)"));
}

#[test]
fn generate_prompt_names_count_level_and_format() {
    let content = "ß".repeat(3000);

    let prompt = study::build_generate_prompt(&content, Difficulty::Basic, 5, 2500);

    assert_eq!(prompt.matches('ß').count(), 2500);
    assert!(prompt.contains("Crea 5 preguntas tipo MIR/USMLE"));
    assert!(prompt.contains("Nivel: básico (anatomía, bioquímica, fisiología)"));
    for marker in ["PREGUNTA:", "A)", "D)", "RESPUESTA:", "EXPLICACIÓN:"] {
        assert!(prompt.contains(marker), "missing {marker}");
    }
}

#[test]
fn api_key_debug_is_redacted() {
    let key = ApiKey::new(" sk-secret ").unwrap();
    assert_eq!(key.expose(), "sk-secret");
    assert!(!format!("{:?}", key).contains("sk-secret"));
    assert!(ApiKey::new("  ").is_none());
}

#[tokio::test]
async fn client_sends_persona_prompt_and_budget() {
    let (api_base, seen) = spawn_fake_api(
        StatusCode::OK,
        json!({ "choices": [{ "message": { "role": "assistant", "content": "Hola" } }] }),
    )
    .await;
    let chat = client_for(&api_base);

    let request = ChatRequest {
        system: "sistema".to_string(),
        user: "usuario".to_string(),
        max_tokens: 300,
    };
    let reply = chat.complete(&key(), &request).await.unwrap();
    assert_eq!(reply, "Hola");

    let seen = seen.lock().unwrap();
    let (auth, body) = &seen[0];
    assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
    assert_eq!(body["model"], "gpt-4-turbo");
    assert_eq!(body["max_tokens"], 300);
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][0]["content"], "sistema");
    assert_eq!(body["messages"][1]["role"], "user");
    assert_eq!(body["messages"][1]["content"], "usuario");
}

#[tokio::test]
async fn client_reports_error_status() {
    let (api_base, _) = spawn_fake_api(
        StatusCode::UNAUTHORIZED,
        json!({ "error": { "message": "Incorrect API key provided" } }),
    )
    .await;
    let chat = client_for(&api_base);

    let request = ChatRequest {
        system: String::new(),
        user: String::new(),
        max_tokens: 10,
    };
    let err = chat.complete(&key(), &request).await.unwrap_err();

    match err {
        LlmError::Status { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("Incorrect API key"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn empty_choices_are_an_error() {
    let (api_base, _) = spawn_fake_api(StatusCode::OK, json!({ "choices": [] })).await;
    let chat = client_for(&api_base);

    let request = ChatRequest {
        system: String::new(),
        user: String::new(),
        max_tokens: 10,
    };
    let err = chat.complete(&key(), &request).await.unwrap_err();
    assert!(matches!(err, LlmError::EmptyResponse));
}

#[tokio::test]
async fn verify_trims_and_generate_keeps_the_reply() {
    let (api_base, seen) = spawn_fake_api(
        StatusCode::OK,
        json!({ "choices": [{ "message": { "content": "\n  PREGUNTA: ...\n" } }] }),
    )
    .await;
    let chat = client_for(&api_base);
    let settings = PromptSettings::default();

    let assessment = study::verify(&chat, &key(), &settings, "texto").await;
    assert_eq!(assessment, "PREGUNTA: ...");

    let questions =
        study::generate(&chat, &key(), &settings, "texto", Difficulty::Clinical, 5).await;
    assert_eq!(questions, "\n  PREGUNTA: ...\n");

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].1["max_tokens"], 300);
    assert_eq!(seen[0].1["messages"][0]["content"], study::VERIFY_PERSONA);
    assert_eq!(seen[1].1["max_tokens"], 1200);
    assert_eq!(seen[1].1["messages"][0]["content"], study::GENERATE_PERSONA);
}

#[tokio::test]
async fn unreachable_api_yields_warning_strings() {
    // Nothing listens on the discard port.
    let chat = client_for("http://127.0.0.1:9/v1");
    let settings = PromptSettings::default();

    let assessment = study::verify(&chat, &key(), &settings, "texto").await;
    assert!(assessment.starts_with("⚠️ Error al verificar:"));

    let questions =
        study::generate(&chat, &key(), &settings, "texto", Difficulty::Basic, 5).await;
    assert!(questions.starts_with("⚠️ Error al generar preguntas:"));
}

#[test]
fn invalid_base_url_is_rejected() {
    let result = OpenAiChat::new(&LlmSettings {
        api_base: "not a url".to_string(),
        ..LlmSettings::default()
    });
    assert!(matches!(result, Err(LlmError::InvalidBaseUrl(_))));
}
