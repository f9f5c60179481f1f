// src/main.rs

use std::sync::Arc;
use std::time::Duration;

use dotenvy::dotenv;
use studyflow::config::Config;
use studyflow::db;
use studyflow::routes;
use studyflow::services::llm::OpenAiChat;
use studyflow::state::{AppState, SessionStore};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let pool = db::connect(&config.database_url)
        .await
        .expect("Failed to open the results database");
    tracing::info!("Database connected...");

    // Run Migrations Automatically
    tracing::info!("Running migrations...");
    db::migrate(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations applied successfully.");

    let chat = OpenAiChat::new(&config.llm).expect("Invalid chat-completion settings");
    tracing::info!(
        "Chat-completion endpoint: {} (model {})",
        config.llm.api_base,
        config.llm.model
    );

    let sessions = SessionStore::new(config.session_ttl_secs);
    spawn_session_sweeper(sessions.clone());

    let state = AppState {
        pool,
        config: config.clone(),
        sessions,
        chat: Arc::new(chat),
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind listening address");

    // Start the server
    axum::serve(listener, app).await.expect("Server error");
}

/// Periodically drops idle sessions so their uploaded text does not linger in memory.
fn spawn_session_sweeper(sessions: SessionStore) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(60));
        loop {
            ticker.tick().await;
            let dropped = sessions.sweep_expired().await;
            if dropped > 0 {
                tracing::debug!("Dropped {} expired sessions", dropped);
            }
        }
    });
}
