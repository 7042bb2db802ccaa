pub mod error;
pub mod handlers;
pub mod models;
pub mod parser;
pub mod routes;
pub mod session;
pub mod state;

use std::sync::Arc;

pub fn build_state() -> anyhow::Result<state::AppState> {
    let generator: Arc<dyn state::QuizGenerator> = match state::HttpQuizGenerator::from_env() {
        Some(real) => {
            let real = real?;
            tracing::info!("using quiz service at {}", real.base_url);
            Arc::new(real)
        }
        None => {
            tracing::warn!("QUIZ_SERVICE_URL not set, serving mock quizzes");
            Arc::new(state::MockQuizGenerator)
        }
    };
    let ttl_secs = std::env::var("QUIZ_TTL_SECS")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(state::DEFAULT_QUIZ_TTL_SECS);
    Ok(state::AppState::new(generator).with_quiz_ttl(chrono::Duration::seconds(ttl_secs)))
}
