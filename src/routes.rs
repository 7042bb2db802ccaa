use crate::handlers;
use crate::state::AppState;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

fn cors_layer() -> CorsLayer {
    let origin = std::env::var("CORS_ORIGIN")
        .ok()
        .and_then(|v| HeaderValue::from_str(v.trim()).ok())
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CORS_ORIGIN));
    CorsLayer::new()
        .allow_credentials(true)
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
            axum::http::header::COOKIE,
            axum::http::HeaderName::from_static("x-request-id"),
        ])
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/v1/quiz", post(handlers::create_quiz))
        .route("/api/v1/quiz/generate", post(handlers::generate_quiz))
        .route(
            "/api/v1/quiz/:quiz_id",
            get(handlers::get_quiz).delete(handlers::delete_quiz),
        )
        .route("/api/v1/quiz/:quiz_id/score", get(handlers::quiz_score))
        .route(
            "/api/v1/quiz/:quiz_id/questions/:index/select",
            post(handlers::select_option),
        )
        .route(
            "/api/v1/quiz/:quiz_id/questions/:index/check",
            post(handlers::check_answer),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
}
