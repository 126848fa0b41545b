// src/routes.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{Method, header},
    routing::get,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    docs::ApiDoc,
    error::AppError,
    handlers::{health, quiz_results},
    state::AppState,
};

/// Submissions carry every answer inline.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Assembles the main application router.
///
/// * Quiz result submission and listing, health.
/// * Swagger UI at `/api-docs`, backed by `/api-docs.json`.
/// * Applies global middleware (Trace, CORS, body limit).
/// * Injects global state (pool and notifier).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route(
            "/api/quiz-results",
            get(quiz_results::list_results).post(quiz_results::submit_result),
        )
        .route("/health", get(health::health))
        .merge(SwaggerUi::new("/api-docs").url("/api-docs.json", ApiDoc::openapi()))
        .fallback(not_found)
        // Global Middleware (applied from outside in)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::NotFound("Endpoint not found".to_string())
}
