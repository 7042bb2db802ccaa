use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("question {index} has no selected option")]
    NoSelection { index: usize },
    #[error("question index {index} is out of range (quiz has {len} questions)")]
    QuestionOutOfRange { index: usize, len: usize },
    #[error("option {option:?} does not belong to question {index}")]
    UnknownOption { index: usize, option: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    pub field: String,
    pub issue: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: ErrorPayload,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ErrorDetail>,
    pub request_id: String,
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub details: Vec<ErrorDetail>,
    pub request_id: String,
}

impl AppError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: Vec::new(),
            request_id: request_id.into(),
        }
    }

    pub fn with_details(mut self, details: Vec<ErrorDetail>) -> Self {
        self.details = details;
        self
    }

    pub fn from_session(err: SessionError, request_id: impl Into<String>) -> Self {
        let message = err.to_string();
        match err {
            SessionError::NoSelection { index } => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, "NO_SELECTION", message, request_id).with_details(vec![
                    ErrorDetail {
                        field: format!("questions[{index}].selectedOption"),
                        issue: "select an option before checking".into(),
                    },
                ])
            }
            SessionError::QuestionOutOfRange { index, .. } => {
                Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message, request_id).with_details(vec![
                    ErrorDetail {
                        field: "index".into(),
                        issue: format!("{index} is out of range"),
                    },
                ])
            }
            SessionError::UnknownOption { index, .. } => {
                Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message, request_id).with_details(vec![
                    ErrorDetail {
                        field: format!("questions[{index}].option"),
                        issue: "must be one of the question's options".into(),
                    },
                ])
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let payload = ErrorBody {
            error: ErrorPayload {
                code: self.code,
                message: self.message,
                details: self.details,
                request_id: self.request_id,
            },
        };
        (self.status, Json(payload)).into_response()
    }
}
