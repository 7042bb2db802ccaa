use crate::parser::parse_quiz;
use crate::session::QuizSession;
use chrono::{DateTime, Utc};
use dashmap::mapref::one::RefMut;
use dashmap::DashMap;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

pub trait QuizGenerator: Send + Sync {
    fn generate_quiz_text(
        &self,
        document_id: i64,
        num_questions: usize,
    ) -> BoxFuture<'static, anyhow::Result<String>>;
}

#[derive(Clone)]
pub struct MockQuizGenerator;

impl QuizGenerator for MockQuizGenerator {
    fn generate_quiz_text(
        &self,
        document_id: i64,
        num_questions: usize,
    ) -> BoxFuture<'static, anyhow::Result<String>> {
        Box::pin(async move {
            let mut text = String::new();
            for idx in 1..=num_questions.max(1) {
                text.push_str(&format!(
                    "Question {idx}: Which statement about document {document_id} is true ({idx})?\n\
                     A) It is empty\n\
                     B) It was uploaded\n\
                     C) It is encrypted\n\
                     D) It is a picture\n\
                     Correct Answer: B\n\n"
                ));
            }
            Ok(text)
        })
    }
}

#[derive(Debug, Serialize)]
struct GenerateQuizRequest {
    document_id: i64,
    num_questions: usize,
}

#[derive(Debug, Deserialize)]
struct GenerateQuizResponse {
    quiz: String,
}

#[derive(Debug, Deserialize)]
struct UpstreamError {
    detail: Option<String>,
}

#[derive(Clone)]
pub struct HttpQuizGenerator {
    pub base_url: String,
    pub bearer: Option<String>,
    pub timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpQuizGenerator {
    pub fn new(base_url: impl Into<String>, bearer: Option<String>, timeout_secs: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer,
            timeout_secs,
            client,
        })
    }

    pub fn from_env() -> Option<anyhow::Result<Self>> {
        let base_url = std::env::var("QUIZ_SERVICE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())?;
        let bearer = std::env::var("QUIZ_SERVICE_TOKEN")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let timeout_secs = std::env::var("QUIZ_SERVICE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);
        Some(Self::new(base_url, bearer, timeout_secs))
    }
}

impl QuizGenerator for HttpQuizGenerator {
    fn generate_quiz_text(
        &self,
        document_id: i64,
        num_questions: usize,
    ) -> BoxFuture<'static, anyhow::Result<String>> {
        let url = format!("{}/api/generate-quiz", self.base_url);
        let mut request = self.client.post(url).json(&GenerateQuizRequest {
            document_id,
            num_questions,
        });
        if let Some(token) = &self.bearer {
            request = request.bearer_auth(token);
        }

        Box::pin(async move {
            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                let detail = response
                    .json::<UpstreamError>()
                    .await
                    .ok()
                    .and_then(|e| e.detail)
                    .unwrap_or_else(|| status.to_string());
                anyhow::bail!("quiz service returned {}: {}", status.as_u16(), detail);
            }
            let body: GenerateQuizResponse = response.json().await?;
            if body.quiz.trim().is_empty() {
                anyhow::bail!("quiz service returned empty quiz text");
            }
            Ok(body.quiz)
        })
    }
}

#[derive(Debug, Clone)]
pub struct ActiveQuiz {
    pub id: Uuid,
    pub document_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub session: QuizSession,
}

pub const DEFAULT_QUIZ_TTL_SECS: i64 = 6 * 60 * 60;

#[derive(Clone)]
pub struct AppState {
    // keyed by client id, at most one active quiz each
    pub quizzes: Arc<DashMap<String, ActiveQuiz>>,
    pub generator: Arc<dyn QuizGenerator>,
    pub quiz_ttl: chrono::Duration,
}

impl AppState {
    pub fn new(generator: Arc<dyn QuizGenerator>) -> Self {
        Self {
            quizzes: Arc::new(DashMap::new()),
            generator,
            quiz_ttl: chrono::Duration::seconds(DEFAULT_QUIZ_TTL_SECS),
        }
    }

    pub fn with_quiz_ttl(mut self, ttl: chrono::Duration) -> Self {
        self.quiz_ttl = ttl;
        self
    }

    fn is_expired(&self, quiz: &ActiveQuiz, now: DateTime<Utc>) -> bool {
        now - quiz.created_at >= self.quiz_ttl
    }

    pub fn prune_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.quizzes.len();
        self.quizzes.retain(|_, quiz| !self.is_expired(quiz, now));
        let removed = before.saturating_sub(self.quizzes.len());
        if removed > 0 {
            info!("dropped {} expired quizzes", removed);
        }
        removed
    }

    pub fn start_quiz(&self, client_id: &str, raw: &str, document_id: Option<i64>) -> ActiveQuiz {
        let quiz = ActiveQuiz {
            id: Uuid::new_v4(),
            document_id,
            created_at: Utc::now(),
            session: QuizSession::new(parse_quiz(raw)),
        };
        self.prune_expired(quiz.created_at);
        if quiz.session.is_empty() {
            warn!("quiz text for client {} produced no questions", client_id);
        }
        if let Some(previous) = self.quizzes.insert(client_id.to_string(), quiz.clone()) {
            info!("quiz {} replaced by {} for client {}", previous.id, quiz.id, client_id);
        }
        quiz
    }

    pub fn active_quiz(&self, client_id: &str, quiz_id: Uuid) -> Option<RefMut<'_, String, ActiveQuiz>> {
        let now = Utc::now();
        self.quizzes
            .get_mut(client_id)
            .filter(|entry| entry.id == quiz_id && !self.is_expired(entry, now))
    }

    pub fn discard_quiz(&self, client_id: &str, quiz_id: Uuid) -> bool {
        self.quizzes
            .remove_if(client_id, |_, quiz| quiz.id == quiz_id)
            .is_some()
    }
}
