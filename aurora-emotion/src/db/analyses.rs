//! Persisted emotion analyses
//!
//! One row per analysis made on behalf of an identified caller. Timestamps
//! are stored as RFC 3339 UTC strings with fixed precision, so range filters
//! compare lexicographically.

use aurora_common::time::{parse_rfc3339, to_rfc3339};
use aurora_common::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::types::{EmotionCategory, EmotionResult, SecondaryEmotion};

/// A persisted analysis
#[derive(Debug, Clone, PartialEq)]
pub struct StoredAnalysis {
    pub id: Uuid,
    pub user_id: String,
    pub emotion: EmotionCategory,
    pub intensity: f32,
    pub confidence: f32,
    pub reasoning: String,
    pub secondary_emotions: Vec<SecondaryEmotion>,
    /// Timestamp supplied by the client with the request, verbatim
    pub client_timestamp: Option<String>,
    pub analyzed_at: DateTime<Utc>,
}

/// Save one analysis result
///
/// `analyzed_at` is taken from the result metadata, falling back to now when
/// the metadata timestamp does not parse.
pub async fn save_analysis(
    pool: &SqlitePool,
    user_id: &str,
    result: &EmotionResult,
    client_timestamp: Option<&str>,
) -> Result<Uuid> {
    let id = Uuid::new_v4();
    let secondary = serde_json::to_string(&result.secondary_emotions)
        .map_err(|e| Error::Storage(format!("Failed to serialize secondary emotions: {}", e)))?;
    let analyzed_at = parse_rfc3339(&result.metadata.analysis_timestamp)
        .unwrap_or_else(Utc::now);

    sqlx::query(
        r#"
        INSERT INTO emotion_analyses (
            id, user_id, emotion, intensity, confidence,
            reasoning, secondary_emotions, client_timestamp, analyzed_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(user_id)
    .bind(result.emotion.as_str())
    .bind(result.intensity as f64)
    .bind(result.confidence as f64)
    .bind(&result.reasoning)
    .bind(&secondary)
    .bind(client_timestamp)
    .bind(to_rfc3339(analyzed_at))
    .execute(pool)
    .await?;

    tracing::debug!(user_id, analysis_id = %id, "Emotion analysis saved");

    Ok(id)
}

/// Load a user's analyses made at or after `since`, oldest first
pub async fn load_history(
    pool: &SqlitePool,
    user_id: &str,
    since: DateTime<Utc>,
) -> Result<Vec<StoredAnalysis>> {
    let rows = sqlx::query(
        r#"
        SELECT id, user_id, emotion, intensity, confidence,
               reasoning, secondary_emotions, client_timestamp, analyzed_at
        FROM emotion_analyses
        WHERE user_id = ? AND analyzed_at >= ?
        ORDER BY analyzed_at ASC
        "#,
    )
    .bind(user_id)
    .bind(to_rfc3339(since))
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            let id: String = row.get("id");
            let id = Uuid::parse_str(&id)
                .map_err(|e| Error::Storage(format!("Invalid analysis id {}: {}", id, e)))?;

            let emotion: String = row.get("emotion");
            let emotion = emotion
                .parse::<EmotionCategory>()
                .map_err(Error::Storage)?;

            let secondary: String = row.get("secondary_emotions");
            let secondary_emotions = serde_json::from_str(&secondary).map_err(|e| {
                Error::Storage(format!("Failed to deserialize secondary emotions: {}", e))
            })?;

            let analyzed_at: String = row.get("analyzed_at");
            let analyzed_at = parse_rfc3339(&analyzed_at).ok_or_else(|| {
                Error::Storage(format!("Invalid analyzed_at timestamp: {}", analyzed_at))
            })?;

            let intensity: f64 = row.get("intensity");
            let confidence: f64 = row.get("confidence");

            Ok(StoredAnalysis {
                id,
                user_id: row.get("user_id"),
                emotion,
                intensity: intensity as f32,
                confidence: confidence as f32,
                reasoning: row.get("reasoning"),
                secondary_emotions,
                client_timestamp: row.get("client_timestamp"),
                analyzed_at,
            })
        })
        .collect()
}
