//! Error handling module for the slide composition backend.
//!
//! Provides centralized error types with mapping to HTTP status codes and response envelopes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::models::Stage;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const AUTH_REQUIRED: &str = "AUTH_REQUIRED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const PRECONDITION_FAILED: &str = "PRECONDITION_FAILED";
    pub const INVALID_STAGE: &str = "INVALID_STAGE";
    pub const OPERATION_IN_PROGRESS: &str = "OPERATION_IN_PROGRESS";
    pub const GENERATION_FAILED: &str = "GENERATION_FAILED";
    pub const ANALYSIS_FAILED: &str = "ANALYSIS_FAILED";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Application error type.
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// API key missing or wrong
    Unauthorized(String),
    /// Export attempted without a user credential
    AuthRequired(String),
    /// Slide index out of range
    NotFound(String),
    /// Invalid caller input
    Validation(String),
    /// Slide record lacks a field the operation needs
    Precondition(String),
    /// Operation not allowed in the current workflow stage
    InvalidStage { message: String, stage: Stage },
    /// Same operation already outstanding
    Busy(String),
    /// Draft or export service unreachable or malformed
    Generation(String),
    /// Layout analysis failed or returned a malformed scene
    Analysis(String),
    /// Internal server error
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::AuthRequired(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Precondition(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidStage { .. } => StatusCode::CONFLICT,
            AppError::Busy(_) => StatusCode::CONFLICT,
            AppError::Generation(_) => StatusCode::BAD_GATEWAY,
            AppError::Analysis(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::AuthRequired(_) => codes::AUTH_REQUIRED,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::Precondition(_) => codes::PRECONDITION_FAILED,
            AppError::InvalidStage { .. } => codes::INVALID_STAGE,
            AppError::Busy(_) => codes::OPERATION_IN_PROGRESS,
            AppError::Generation(_) => codes::GENERATION_FAILED,
            AppError::Analysis(_) => codes::ANALYSIS_FAILED,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::AuthRequired(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Validation(msg) => msg.clone(),
            AppError::Precondition(msg) => msg.clone(),
            AppError::InvalidStage { message, .. } => message.clone(),
            AppError::Busy(msg) => msg.clone(),
            AppError::Generation(msg) => msg.clone(),
            AppError::Analysis(msg) => msg.clone(),
            AppError::Internal(msg) => msg.clone(),
        }
    }

    /// Shorthand for a stage mismatch.
    pub fn invalid_stage(operation: &str, stage: Stage) -> Self {
        AppError::InvalidStage {
            message: format!("Cannot {} while the project is in the {} stage", operation, stage),
            stage,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

/// Error details in the response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
    pub revision_id: i64,
}

impl ErrorResponse {
    pub fn new(error: &AppError, revision_id: i64) -> Self {
        let details = match error {
            AppError::InvalidStage { stage, .. } => {
                Some(serde_json::json!({ "currentStage": stage }))
            }
            _ => None,
        };

        Self {
            success: false,
            error: ErrorDetails {
                code: error.error_code().to_string(),
                message: error.message(),
                details,
            },
            revision_id,
        }
    }
}

/// Wrapper type for errors that carry revision_id context.
pub struct AppErrorWithRevision {
    pub error: AppError,
    pub revision_id: i64,
}

impl IntoResponse for AppErrorWithRevision {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        let body = ErrorResponse::new(&self.error, self.revision_id);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_status_codes() {
        assert_eq!(
            AppError::Generation("x".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Precondition("x".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::AuthRequired("x".into()).error_code(),
            codes::AUTH_REQUIRED
        );
    }

    #[test]
    fn test_caller_input_is_validation_error() {
        let err = AppError::Validation("Topic must not be empty".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), codes::VALIDATION_ERROR);
        assert_eq!(err.to_string(), "VALIDATION_ERROR: Topic must not be empty");
    }

    #[test]
    fn test_invalid_stage_details() {
        let err = AppError::invalid_stage("advance", Stage::Draft);
        let body = ErrorResponse::new(&err, 7);
        assert_eq!(body.error.code, codes::INVALID_STAGE);
        assert_eq!(body.revision_id, 7);
        assert_eq!(
            body.error.details,
            Some(serde_json::json!({ "currentStage": "draft" }))
        );
        assert!(body.error.message.contains("draft"));
    }
}
