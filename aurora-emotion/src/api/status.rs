//! Emotion status endpoint
//!
//! GET /status?userId=..&timeframe=day|week|month summarizes a user's
//! persisted analyses over the timeframe.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::db::analyses::{load_history, StoredAnalysis};
use crate::error::{ApiError, ApiResult};
use crate::types::EmotionCategory;
use crate::AppState;

/// Intensity reported when there is no history
const DEFAULT_AVERAGE_INTENSITY: f32 = 0.5;

/// Lookback window for status queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    Day,
    Week,
    Month,
}

impl Timeframe {
    pub fn duration(&self) -> Duration {
        match self {
            Timeframe::Day => Duration::days(1),
            Timeframe::Week => Duration::days(7),
            Timeframe::Month => Duration::days(30),
        }
    }

    pub fn since(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.duration()
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Timeframe::Day),
            "week" => Ok(Timeframe::Week),
            "month" => Ok(Timeframe::Month),
            other => Err(format!(
                "unknown timeframe '{}', expected day, week or month",
                other
            )),
        }
    }
}

/// GET /status query
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusQuery {
    pub user_id: Option<String>,
    pub timeframe: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct HistoryEntry {
    pub emotion: EmotionCategory,
    pub intensity: f32,
    pub confidence: f32,
    pub timestamp: String,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub current_emotion: EmotionCategory,
    pub emotion_history: Vec<HistoryEntry>,
    pub average_intensity: f32,
}

impl StatusResponse {
    /// Summarize history ordered oldest first; the newest entry is current
    pub fn from_history(history: &[StoredAnalysis]) -> Self {
        let current_emotion = history
            .last()
            .map(|a| a.emotion)
            .unwrap_or(EmotionCategory::Neutral);

        let average_intensity = if history.is_empty() {
            DEFAULT_AVERAGE_INTENSITY
        } else {
            history.iter().map(|a| a.intensity).sum::<f32>() / history.len() as f32
        };

        let emotion_history = history
            .iter()
            .map(|a| HistoryEntry {
                emotion: a.emotion,
                intensity: a.intensity,
                confidence: a.confidence,
                timestamp: aurora_common::time::to_rfc3339(a.analyzed_at),
            })
            .collect();

        Self {
            current_emotion,
            emotion_history,
            average_intensity,
        }
    }
}

/// GET /status
pub async fn get_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> ApiResult<Json<StatusResponse>> {
    let user_id = query
        .user_id
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("userId is required".to_string()))?;

    let timeframe = match query.timeframe.as_deref() {
        Some(t) => t.parse::<Timeframe>().map_err(ApiError::BadRequest)?,
        None => Timeframe::Day,
    };

    tracing::info!(user_id = %user_id, ?timeframe, "Emotion status request");

    let history = load_history(&state.db, &user_id, timeframe.since(Utc::now())).await?;

    Ok(Json(StatusResponse::from_history(&history)))
}

/// Build status routes
pub fn status_routes() -> Router<AppState> {
    Router::new().route("/status", get(get_status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn stored(emotion: EmotionCategory, intensity: f32) -> StoredAnalysis {
        StoredAnalysis {
            id: Uuid::new_v4(),
            user_id: "u1".to_string(),
            emotion,
            intensity,
            confidence: 0.6,
            reasoning: String::new(),
            secondary_emotions: Vec::new(),
            client_timestamp: None,
            analyzed_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_timeframe_parsing() {
        assert_eq!("day".parse::<Timeframe>(), Ok(Timeframe::Day));
        assert_eq!("Week".parse::<Timeframe>(), Ok(Timeframe::Week));
        assert_eq!("month".parse::<Timeframe>(), Ok(Timeframe::Month));
        assert!("year".parse::<Timeframe>().is_err());
    }

    #[test]
    fn test_empty_history_is_neutral() {
        let status = StatusResponse::from_history(&[]);
        assert_eq!(status.current_emotion, EmotionCategory::Neutral);
        assert_eq!(status.average_intensity, 0.5);
        assert!(status.emotion_history.is_empty());
    }

    #[test]
    fn test_summary_uses_latest_and_mean() {
        let history = vec![
            stored(EmotionCategory::Joy, 0.8),
            stored(EmotionCategory::Sadness, 0.4),
        ];
        let status = StatusResponse::from_history(&history);
        assert_eq!(status.current_emotion, EmotionCategory::Sadness);
        assert!((status.average_intensity - 0.6).abs() < 1e-6);
        assert_eq!(status.emotion_history.len(), 2);
    }
}
