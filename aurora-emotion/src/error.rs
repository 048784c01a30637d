//! Error types for aurora-emotion HTTP layer

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::types::AnalysisError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Analysis could not produce a result (500)
    #[error("Emotion analysis failed: {0}")]
    AnalysisFailed(String),

    /// aurora-common error
    #[error("Common error: {0}")]
    Common(#[from] aurora_common::Error),
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::EmptyText => ApiError::BadRequest(err.to_string()),
            AnalysisError::Assembly(_) => ApiError::AnalysisFailed(err.to_string()),
        }
    }
}

/// Malformed or unreadable JSON bodies are reported in the standard envelope
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::AnalysisFailed(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "ANALYSIS_FAILED",
                msg,
            ),
            ApiError::Common(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "COMMON_ERROR",
                err.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_error_mapping() {
        assert!(matches!(
            ApiError::from(AnalysisError::EmptyText),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(AnalysisError::Assembly("nan".to_string())),
            ApiError::AnalysisFailed(_)
        ));
    }

    #[test]
    fn test_status_codes() {
        let response = ApiError::BadRequest("x".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ApiError::AnalysisFailed("x".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
