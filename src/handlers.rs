use crate::error::{AppError, ErrorDetail};
use crate::models::{OptionMark, QuestionPhase, QuizScore, Verdict};
use crate::state::{ActiveQuiz, AppState};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

pub const CLIENT_COOKIE: &str = "quiz_client";
const MAX_QUESTIONS: usize = 10;

fn request_id_from_headers(headers: &HeaderMap) -> String {
    headers
        .get("x-request-id")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

fn client_id(jar: &CookieJar) -> Option<String> {
    jar.get(CLIENT_COOKIE).map(|c| c.value().to_string())
}

fn ensure_client(jar: CookieJar) -> (CookieJar, String) {
    if let Some(id) = client_id(&jar) {
        return (jar, id);
    }
    let id = Uuid::new_v4().to_string();
    let cookie = Cookie::build((CLIENT_COOKIE, id.clone()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .build();
    (jar.add(cookie), id)
}

fn quiz_not_found(req_id: String) -> AppError {
    AppError::new(StatusCode::NOT_FOUND, "NOT_FOUND", "quiz not found or replaced", req_id)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionView {
    pub text: String,
    pub mark: OptionMark,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerdictView {
    #[serde(flatten)]
    pub verdict: Verdict,
    pub feedback: String,
}

impl From<Verdict> for VerdictView {
    fn from(verdict: Verdict) -> Self {
        let feedback = verdict.feedback();
        Self { verdict, feedback }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub index: usize,
    pub prompt_text: String,
    pub options: Vec<OptionView>,
    pub phase: QuestionPhase,
    pub selected_option: Option<String>,
    pub locked: bool,
    // absent until the question is locked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<VerdictView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizView {
    pub quiz_id: Uuid,
    pub document_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub questions: Vec<QuestionView>,
    pub score: ScoreView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreView {
    #[serde(flatten)]
    pub score: QuizScore,
    pub correct_pct: f64,
}

impl From<QuizScore> for ScoreView {
    fn from(score: QuizScore) -> Self {
        let correct_pct = score.correct_pct();
        Self { score, correct_pct }
    }
}

fn question_view(quiz: &ActiveQuiz, index: usize) -> Option<QuestionView> {
    let session = &quiz.session;
    let question = session.questions().get(index)?;
    let state = session.states().get(index)?;
    let options = session
        .option_marks(index)
        .ok()?
        .into_iter()
        .map(|(text, mark)| OptionView { text, mark })
        .collect();
    Some(QuestionView {
        index,
        prompt_text: question.prompt_text.clone(),
        options,
        phase: state.phase(),
        selected_option: state.selected_option.clone(),
        locked: state.locked,
        verdict: session.verdict_of(index).ok().flatten().cloned().map(VerdictView::from),
    })
}

fn quiz_view(quiz: &ActiveQuiz) -> QuizView {
    QuizView {
        quiz_id: quiz.id,
        document_id: quiz.document_id,
        created_at: quiz.created_at,
        questions: (0..quiz.session.len())
            .filter_map(|i| question_view(quiz, i))
            .collect(),
        score: quiz.session.score().into(),
    }
}

fn default_num_questions() -> usize {
    5
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuizPayload {
    pub document_id: i64,
    #[serde(default = "default_num_questions")]
    pub num_questions: usize,
}

pub async fn generate_quiz(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(payload): Json<GenerateQuizPayload>,
) -> Result<(StatusCode, CookieJar, Json<QuizView>), AppError> {
    let req_id = request_id_from_headers(&headers);
    if payload.num_questions == 0 || payload.num_questions > MAX_QUESTIONS {
        return Err(AppError::new(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "invalid number of questions",
            req_id,
        )
        .with_details(vec![ErrorDetail {
            field: "numQuestions".into(),
            issue: format!("must be between 1 and {MAX_QUESTIONS}"),
        }]));
    }

    let raw = state
        .generator
        .generate_quiz_text(payload.document_id, payload.num_questions)
        .await
        .map_err(|e| {
            warn!("quiz generation failed for document {}: {}", payload.document_id, e);
            AppError::new(
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_ERROR",
                format!("quiz generation failed: {}", e),
                req_id.clone(),
            )
        })?;

    let (jar, client) = ensure_client(jar);
    let quiz = state.start_quiz(&client, &raw, Some(payload.document_id));
    info!(
        "generated quiz {} with {} questions for document {}",
        quiz.id,
        quiz.session.len(),
        payload.document_id
    );
    Ok((StatusCode::CREATED, jar, Json(quiz_view(&quiz))))
}

#[derive(Debug, Deserialize)]
pub struct CreateQuizPayload {
    pub text: String,
}

pub async fn create_quiz(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<CreateQuizPayload>,
) -> (StatusCode, CookieJar, Json<QuizView>) {
    let (jar, client) = ensure_client(jar);
    let quiz = state.start_quiz(&client, &payload.text, None);
    info!("created quiz {} with {} questions", quiz.id, quiz.session.len());
    (StatusCode::CREATED, jar, Json(quiz_view(&quiz)))
}

pub async fn get_quiz(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Path(quiz_id): Path<Uuid>,
) -> Result<Json<QuizView>, AppError> {
    let req_id = request_id_from_headers(&headers);
    let client = client_id(&jar).ok_or_else(|| quiz_not_found(req_id.clone()))?;
    let quiz = state
        .active_quiz(&client, quiz_id)
        .ok_or_else(|| quiz_not_found(req_id))?;
    Ok(Json(quiz_view(&quiz)))
}

#[derive(Debug, Deserialize)]
pub struct SelectPayload {
    pub option: String,
}

pub async fn select_option(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Path((quiz_id, index)): Path<(Uuid, usize)>,
    Json(payload): Json<SelectPayload>,
) -> Result<Json<QuestionView>, AppError> {
    let req_id = request_id_from_headers(&headers);
    let client = client_id(&jar).ok_or_else(|| quiz_not_found(req_id.clone()))?;
    let mut quiz = state
        .active_quiz(&client, quiz_id)
        .ok_or_else(|| quiz_not_found(req_id.clone()))?;
    quiz.session
        .select(index, &payload.option)
        .map_err(|e| AppError::from_session(e, req_id.clone()))?;
    question_view(&quiz, index)
        .map(Json)
        .ok_or_else(|| quiz_not_found(req_id))
}

pub async fn check_answer(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Path((quiz_id, index)): Path<(Uuid, usize)>,
) -> Result<Json<VerdictView>, AppError> {
    let req_id = request_id_from_headers(&headers);
    let client = client_id(&jar).ok_or_else(|| quiz_not_found(req_id.clone()))?;
    let mut quiz = state
        .active_quiz(&client, quiz_id)
        .ok_or_else(|| quiz_not_found(req_id.clone()))?;
    let verdict = quiz
        .session
        .check(index)
        .map_err(|e| AppError::from_session(e, req_id))?;
    Ok(Json(verdict.into()))
}

pub async fn quiz_score(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Path(quiz_id): Path<Uuid>,
) -> Result<Json<ScoreView>, AppError> {
    let req_id = request_id_from_headers(&headers);
    let client = client_id(&jar).ok_or_else(|| quiz_not_found(req_id.clone()))?;
    let quiz = state
        .active_quiz(&client, quiz_id)
        .ok_or_else(|| quiz_not_found(req_id))?;
    Ok(Json(quiz.session.score().into()))
}

pub async fn delete_quiz(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Path(quiz_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let req_id = request_id_from_headers(&headers);
    let client = client_id(&jar).ok_or_else(|| quiz_not_found(req_id.clone()))?;
    if !state.discard_quiz(&client, quiz_id) {
        return Err(quiz_not_found(req_id));
    }
    info!("quiz {} discarded", quiz_id);
    Ok(StatusCode::NO_CONTENT)
}
