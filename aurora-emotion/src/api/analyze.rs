//! Emotion analysis endpoints
//!
//! - POST /analyze - one text with optional context
//! - POST /analyze/batch - up to [`MAX_BATCH_SIZE`] texts, results in input order

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::types::{AnalysisContext, EmotionResult, IntensityBand};
use crate::AppState;

/// Maximum text length in characters
pub const MAX_TEXT_CHARS: usize = 10_000;

/// Maximum number of texts per batch request
pub const MAX_BATCH_SIZE: usize = 100;

/// POST /analyze request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub text: String,
    #[serde(default)]
    pub context: Option<AnalysisContext>,
    #[serde(default)]
    pub user_id: Option<String>,
    /// Client-side timestamp, stored verbatim with the result
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// POST /analyze/batch request
#[derive(Debug, Deserialize)]
pub struct BatchAnalyzeRequest {
    pub texts: Vec<String>,
    #[serde(default)]
    pub contexts: Option<Vec<Option<AnalysisContext>>>,
}

/// Analysis result plus presentation fields
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub result: EmotionResult,
    /// Localized emotion label
    pub display_name: String,
    pub intensity_level: IntensityBand,
}

impl From<EmotionResult> for AnalyzeResponse {
    fn from(result: EmotionResult) -> Self {
        Self {
            display_name: result.emotion.display_name().to_string(),
            intensity_level: result.intensity_band(),
            result,
        }
    }
}

fn validate_text(text: &str) -> Result<(), String> {
    if text.trim().is_empty() {
        return Err("text must not be empty".to_string());
    }
    let length = text.chars().count();
    if length > MAX_TEXT_CHARS {
        return Err(format!(
            "text is {} characters, maximum is {}",
            length, MAX_TEXT_CHARS
        ));
    }
    Ok(())
}

/// POST /analyze
///
/// Results for identified callers are handed to the recorder after the
/// response is built; recording never delays or fails the request.
pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let Json(request) = payload?;
    validate_text(&request.text).map_err(ApiError::BadRequest)?;

    let result = state
        .analyzer
        .analyze(&request.text, request.context.as_ref(), request.user_id.as_deref())
        .await?;

    let response = AnalyzeResponse::from(result.clone());

    if let Some(user_id) = request.user_id {
        state.recorder.record(user_id, result, request.timestamp);
    }

    Ok(Json(response))
}

/// POST /analyze/batch
pub async fn analyze_batch(
    State(state): State<AppState>,
    payload: Result<Json<BatchAnalyzeRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<AnalyzeResponse>>> {
    let Json(request) = payload?;
    if request.texts.is_empty() || request.texts.len() > MAX_BATCH_SIZE {
        return Err(ApiError::BadRequest(format!(
            "batch must contain 1 to {} texts, got {}",
            MAX_BATCH_SIZE,
            request.texts.len()
        )));
    }
    for (index, text) in request.texts.iter().enumerate() {
        validate_text(text)
            .map_err(|e| ApiError::BadRequest(format!("texts[{}]: {}", index, e)))?;
    }

    info!(text_count = request.texts.len(), "Batch analysis request");

    let results = state
        .analyzer
        .batch_analyze(&request.texts, request.contexts.as_deref())
        .await;

    Ok(Json(results.into_iter().map(AnalyzeResponse::from).collect()))
}

/// Build analysis routes
pub fn analyze_routes() -> Router<AppState> {
    Router::new()
        .route("/analyze", post(analyze))
        .route("/analyze/batch", post(analyze_batch))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_text_bounds() {
        assert!(validate_text("hello").is_ok());
        assert!(validate_text("   ").is_err());
        assert!(validate_text(&"a".repeat(MAX_TEXT_CHARS)).is_ok());
        assert!(validate_text(&"a".repeat(MAX_TEXT_CHARS + 1)).is_err());
        // Character count, not bytes
        assert!(validate_text(&"开".repeat(MAX_TEXT_CHARS)).is_ok());
    }

    #[test]
    fn test_request_field_names() {
        let request: AnalyzeRequest = serde_json::from_value(serde_json::json!({
            "text": "hi",
            "userId": "u1",
            "timestamp": "2024-05-01T10:00:00Z",
            "context": {"audio_data": null}
        }))
        .unwrap();
        assert_eq!(request.user_id.as_deref(), Some("u1"));
        assert!(request.context.unwrap().audio_data.is_none());
    }
}
