// src/routes.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{progress, session, study},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Session routes: lifecycle, credential, uploads.
/// * Study routes: verification and exam generation, gated per session.
/// * Progress routes: exam history.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    let session_routes = Router::new()
        .route("/", post(session::create_session))
        .route(
            "/{id}",
            get(session::get_session).delete(session::delete_session),
        )
        .route("/{id}/credential", put(session::set_credential))
        .route(
            "/{id}/files",
            post(session::upload_files)
                .layer(DefaultBodyLimit::max(state.config.max_upload_bytes)),
        )
        .route("/{id}/verify", post(study::verify_content))
        .route("/{id}/exam", post(study::generate_exam));

    let progress_routes = Router::new().route("/", get(progress::list_results));

    Router::new()
        .nest("/api/sessions", session_routes)
        .nest("/api/results", progress_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
