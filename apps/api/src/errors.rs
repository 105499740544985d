use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::ai::AiError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("File upload error: {0}")]
    FileUpload(String),

    #[error("AI error: {0}")]
    Ai(#[from] AiError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::NotFound(_) | AppError::Validation(_) | AppError::Conflict(_) => {
                ErrorCategory::Validation
            }
            AppError::FileUpload(_) => ErrorCategory::FileUpload,
            AppError::Ai(e) => classify_ai_error(e),
            AppError::Internal(e) => classify_error(&format!("{e:#}")),
        }
    }

    /// The sentence shown to the user for this error.
    pub fn user_message(&self) -> &'static str {
        self.category().user_message()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let category = self.category();
        let (status, code, detail) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", Some(msg.clone())),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                Some(msg.clone()),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", Some(msg.clone())),
            AppError::FileUpload(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "FILE_UPLOAD_ERROR",
                Some(msg.clone()),
            ),
            AppError::Ai(e) => {
                tracing::error!("AI error: {e}");
                (StatusCode::BAD_GATEWAY, "AI_ERROR", None)
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", None)
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "category": category,
                "message": category.user_message(),
                "detail": detail,
            }
        }));

        (status, body).into_response()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Error classifier
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Network,
    Auth,
    Validation,
    Ai,
    FileUpload,
    Unknown,
}

/// Checked top to bottom; the first category with a matching substring wins.
const CLASSIFIER_RULES: &[(ErrorCategory, &[&str])] = &[
    (
        ErrorCategory::Network,
        &[
            "network",
            "connection",
            "timed out",
            "timeout",
            "dns",
            "error sending request",
            "failed to fetch",
        ],
    ),
    (
        ErrorCategory::Auth,
        &[
            "api key",
            "api_key",
            "unauthorized",
            "unauthenticated",
            "permission denied",
            "forbidden",
            "status 401",
            "status 403",
        ],
    ),
    (
        ErrorCategory::Validation,
        &["validation", "invalid", "required", "missing field", "must be"],
    ),
    (
        ErrorCategory::Ai,
        &[
            "gemini",
            "model",
            "quota",
            "rate limit",
            "resource has been exhausted",
            "status 429",
            "empty response",
            "blocked",
            "generation",
        ],
    ),
    (
        ErrorCategory::FileUpload,
        &["file", "upload", "pdf", "multipart", "unsupported format"],
    ),
];

/// Maps an error message to a category by case-insensitive substring match.
pub fn classify_error(message: &str) -> ErrorCategory {
    let message = message.to_lowercase();
    CLASSIFIER_RULES
        .iter()
        .find(|(_, needles)| needles.iter().any(|n| message.contains(n)))
        .map(|(category, _)| *category)
        .unwrap_or(ErrorCategory::Unknown)
}

/// Like `classify_error`, but an AI failure is never `Unknown`.
pub fn classify_ai_error(err: &AiError) -> ErrorCategory {
    match classify_error(&err.to_string()) {
        ErrorCategory::Unknown => ErrorCategory::Ai,
        category => category,
    }
}

impl ErrorCategory {
    pub fn user_message(self) -> &'static str {
        match self {
            ErrorCategory::Network => {
                "Network error. Please check your internet connection and try again."
            }
            ErrorCategory::Auth => {
                "Authentication failed. Please check that your API key is configured correctly."
            }
            ErrorCategory::Validation => {
                "Some of the information provided is invalid. Please review it and try again."
            }
            ErrorCategory::Ai => {
                "The AI service could not complete the request. Please try again in a moment."
            }
            ErrorCategory::FileUpload => {
                "The file could not be processed. Please upload a PDF, image or text file and try again."
            }
            ErrorCategory::Unknown => "An unexpected error occurred. Please try again.",
        }
    }
}
