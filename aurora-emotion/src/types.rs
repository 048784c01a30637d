//! Core Types and Trait Definitions for aurora-emotion
//!
//! Defines the base traits of the multimodal pipeline:
//! - **ModalityAnalyzer:** one per input channel (text, audio, visual)
//! - **FusionEngine:** merges per-modality estimates into one verdict
//!
//! and the values that flow between them.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnError};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Emotion Categories
// ============================================================================

/// Closed set of emotion categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionCategory {
    Joy,
    Sadness,
    Anger,
    Fear,
    Surprise,
    Disgust,
    Neutral,
    Anxiety,
    Calm,
    Excitement,
    Frustration,
    Contentment,
    Loneliness,
    Love,
    Hope,
}

impl EmotionCategory {
    pub const ALL: [EmotionCategory; 15] = [
        EmotionCategory::Joy,
        EmotionCategory::Sadness,
        EmotionCategory::Anger,
        EmotionCategory::Fear,
        EmotionCategory::Surprise,
        EmotionCategory::Disgust,
        EmotionCategory::Neutral,
        EmotionCategory::Anxiety,
        EmotionCategory::Calm,
        EmotionCategory::Excitement,
        EmotionCategory::Frustration,
        EmotionCategory::Contentment,
        EmotionCategory::Loneliness,
        EmotionCategory::Love,
        EmotionCategory::Hope,
    ];

    /// Wire label (snake_case)
    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionCategory::Joy => "joy",
            EmotionCategory::Sadness => "sadness",
            EmotionCategory::Anger => "anger",
            EmotionCategory::Fear => "fear",
            EmotionCategory::Surprise => "surprise",
            EmotionCategory::Disgust => "disgust",
            EmotionCategory::Neutral => "neutral",
            EmotionCategory::Anxiety => "anxiety",
            EmotionCategory::Calm => "calm",
            EmotionCategory::Excitement => "excitement",
            EmotionCategory::Frustration => "frustration",
            EmotionCategory::Contentment => "contentment",
            EmotionCategory::Loneliness => "loneliness",
            EmotionCategory::Love => "love",
            EmotionCategory::Hope => "hope",
        }
    }

    /// Presentation name shown to end users
    pub fn display_name(&self) -> &'static str {
        match self {
            EmotionCategory::Joy => "快乐",
            EmotionCategory::Sadness => "悲伤",
            EmotionCategory::Anger => "愤怒",
            EmotionCategory::Fear => "恐惧",
            EmotionCategory::Surprise => "惊讶",
            EmotionCategory::Disgust => "厌恶",
            EmotionCategory::Neutral => "中性",
            EmotionCategory::Anxiety => "焦虑",
            EmotionCategory::Calm => "平静",
            EmotionCategory::Excitement => "兴奋",
            EmotionCategory::Frustration => "沮丧",
            EmotionCategory::Contentment => "满足",
            EmotionCategory::Loneliness => "孤独",
            EmotionCategory::Love => "爱",
            EmotionCategory::Hope => "希望",
        }
    }
}

impl fmt::Display for EmotionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmotionCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        EmotionCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| format!("Unknown emotion category: {}", s))
    }
}

/// Look up the display name of a raw label, returning the label itself when unmapped
///
/// Matching is exact: only the canonical lowercase labels are mapped.
pub fn display_name(label: &str) -> &str {
    EmotionCategory::ALL
        .iter()
        .find(|c| c.as_str() == label)
        .map_or(label, |c| c.display_name())
}

// ============================================================================
// Intensity Bands
// ============================================================================

/// Lower bound of the medium band
pub const INTENSITY_MEDIUM_THRESHOLD: f32 = 0.3;
/// Lower bound of the high band
pub const INTENSITY_HIGH_THRESHOLD: f32 = 0.6;
/// Lower bound of the very-high band
pub const INTENSITY_VERY_HIGH_THRESHOLD: f32 = 0.8;

/// Coarse classification of an intensity value
///
/// Lower bounds are inclusive: 0.3 is medium, 0.6 is high, 0.8 is very high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityBand {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl IntensityBand {
    pub fn classify(intensity: f32) -> Self {
        if intensity.is_nan() || intensity < INTENSITY_MEDIUM_THRESHOLD {
            IntensityBand::Low
        } else if intensity < INTENSITY_HIGH_THRESHOLD {
            IntensityBand::Medium
        } else if intensity < INTENSITY_VERY_HIGH_THRESHOLD {
            IntensityBand::High
        } else {
            IntensityBand::VeryHigh
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IntensityBand::Low => "low",
            IntensityBand::Medium => "medium",
            IntensityBand::High => "high",
            IntensityBand::VeryHigh => "very_high",
        }
    }
}

/// Shorthand for [`IntensityBand::classify`]
pub fn intensity_band(intensity: f32) -> IntensityBand {
    IntensityBand::classify(intensity)
}

/// Clamp a score into [0, 1]. NaN is passed through so assembly can reject it.
pub(crate) fn clamp_unit(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

// ============================================================================
// Modalities and Estimates
// ============================================================================

/// Input channel analyzed independently for emotional signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Text,
    Audio,
    Visual,
}

impl Modality {
    /// Tie-break rank during fusion (lower wins): text > visual > audio
    pub fn priority(&self) -> u8 {
        match self {
            Modality::Text => 0,
            Modality::Visual => 1,
            Modality::Audio => 2,
        }
    }

    /// Prefix used for this modality's fragment in the reasoning trace
    pub fn reasoning_label(&self) -> &'static str {
        match self {
            Modality::Text => "text analysis",
            Modality::Audio => "voice analysis",
            Modality::Visual => "visual analysis",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Text => "text",
            Modality::Audio => "audio",
            Modality::Visual => "visual",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasoning attached to the text fallback estimate
pub const TEXT_FALLBACK_REASONING: &str = "text analysis failed, using default";

/// Reasoning attached to a batch item that could not be analyzed
pub const ANALYSIS_FALLBACK_REASONING: &str = "analysis failed, using default";

/// Per-analyzer emotion estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalityEstimate {
    pub emotion: EmotionCategory,
    /// Intensity (0.0-1.0)
    pub intensity: f32,
    /// Confidence (0.0-1.0)
    pub confidence: f32,
    /// Short explanation from the analyzer
    pub reasoning: String,
}

impl ModalityEstimate {
    /// Create new estimate with scores clamped to [0, 1]
    pub fn new(
        emotion: EmotionCategory,
        intensity: f32,
        confidence: f32,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            emotion,
            intensity: clamp_unit(intensity),
            confidence: clamp_unit(confidence),
            reasoning: reasoning.into(),
        }
    }

    /// Low-confidence neutral estimate substituted when text analysis fails
    pub fn text_fallback() -> Self {
        Self::new(EmotionCategory::Neutral, 0.5, 0.3, TEXT_FALLBACK_REASONING)
    }
}

/// Result of dispatching one modality
///
/// Every call site produces one of these; analyzer faults never escape as errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ModalityOutcome {
    /// Analyzer succeeded
    Estimated(ModalityEstimate),
    /// Mandatory analyzer failed; a default estimate stands in
    Degraded(ModalityEstimate),
    /// Modality input not provided, analyzer not invoked
    Absent,
    /// Optional analyzer failed; excluded from fusion
    Failed(String),
}

impl ModalityOutcome {
    pub fn estimate(&self) -> Option<&ModalityEstimate> {
        match self {
            ModalityOutcome::Estimated(e) | ModalityOutcome::Degraded(e) => Some(e),
            ModalityOutcome::Absent | ModalityOutcome::Failed(_) => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ModalityOutcome::Degraded(_))
    }
}

/// Modality analyzer error
#[derive(Debug, Error)]
pub enum ModalityError {
    /// Input could not be interpreted (empty, wrong shape)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Encoded payload could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// No model loaded for this modality
    #[error("Analyzer not available: {0}")]
    NotAvailable(String),

    /// Internal processing error
    #[error("Internal error: {0}")]
    Internal(String),
}

// ============================================================================
// Context
// ============================================================================

/// Optional request context
///
/// Unknown keys are ignored. A recognized key that is absent or has the wrong
/// shape reads as `None`, and the related step is skipped.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisContext {
    /// Base64-encoded audio clip (WAV)
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_data: Option<String>,
    /// Base64-encoded image
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_data: Option<String>,
    /// Earlier conversation turns, oldest first
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_messages: Option<Vec<serde_json::Value>>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_profile: Option<UserProfile>,
    /// Client-side time of the message
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// User profile fields recognized by the analyzer
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_style: Option<String>,
}

// ============================================================================
// Fusion
// ============================================================================

/// Non-primary category surfaced by fusion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondaryEmotion {
    pub emotion: EmotionCategory,
    pub intensity: f32,
    pub confidence: f32,
}

/// Per-modality reasoning fragments preserved through fusion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModalityReasoning {
    pub text: Option<String>,
    pub audio: Option<String>,
    pub visual: Option<String>,
}

impl ModalityReasoning {
    /// Fragments in trace order: text, voice, visual
    pub fn ordered(&self) -> [(Modality, Option<&str>); 3] {
        [
            (Modality::Text, self.text.as_deref()),
            (Modality::Audio, self.audio.as_deref()),
            (Modality::Visual, self.visual.as_deref()),
        ]
    }
}

/// Output of a fusion engine
#[derive(Debug, Clone, PartialEq)]
pub struct FusionOutcome {
    pub emotion: EmotionCategory,
    pub intensity: f32,
    pub confidence: f32,
    /// Short synthesis of how the verdict was reached
    pub reasoning: String,
    /// Ordered by confidence, descending
    pub secondary_emotions: Vec<SecondaryEmotion>,
    pub modality_reasoning: ModalityReasoning,
}

/// Fusion engine lifecycle error
#[derive(Debug, Error)]
pub enum FusionError {
    #[error("Fusion engine initialization failed: {0}")]
    Initialization(String),
}

// ============================================================================
// Final Result
// ============================================================================

/// Metadata attached to every analysis result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionMetadata {
    /// Input length in characters
    pub text_length: usize,
    pub has_context: bool,
    pub user_id: Option<String>,
    /// RFC 3339
    pub analysis_timestamp: String,
    pub model_version: String,
}

/// Final emotion judgment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionResult {
    pub emotion: EmotionCategory,
    pub intensity: f32,
    pub confidence: f32,
    pub reasoning: String,
    pub secondary_emotions: Vec<SecondaryEmotion>,
    pub metadata: EmotionMetadata,
}

impl EmotionResult {
    /// Degraded result used in place of a failed batch item
    pub fn fallback(metadata: EmotionMetadata) -> Self {
        Self {
            emotion: EmotionCategory::Neutral,
            intensity: 0.5,
            confidence: 0.3,
            reasoning: ANALYSIS_FALLBACK_REASONING.to_string(),
            secondary_emotions: Vec::new(),
            metadata,
        }
    }

    pub fn intensity_band(&self) -> IntensityBand {
        IntensityBand::classify(self.intensity)
    }
}

/// Caller-visible analysis failure
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Input text empty or whitespace only
    #[error("Text must not be empty")]
    EmptyText,

    /// Final result could not be assembled
    #[error("Result assembly failed: {0}")]
    Assembly(String),
}

// ============================================================================
// Traits
// ============================================================================

/// Capability provider for one modality
///
/// Implementations are constructed once at startup, loaded, and then shared
/// read-only across all concurrent analyses.
#[async_trait::async_trait]
pub trait ModalityAnalyzer: Send + Sync {
    /// Which channel this analyzer handles
    fn modality(&self) -> Modality;

    /// Analyzer name for logs
    fn name(&self) -> &'static str;

    /// Load models or other resources before first use
    async fn load(&self) -> Result<(), ModalityError> {
        Ok(())
    }

    /// Estimate the emotion carried by `input`
    ///
    /// # Errors
    /// Any error is absorbed by the orchestrator (degraded or absent estimate).
    async fn analyze(
        &self,
        input: &str,
        context: Option<&AnalysisContext>,
    ) -> Result<ModalityEstimate, ModalityError>;
}

/// Combines per-modality estimates into one verdict
///
/// `fuse` is infallible: with only a text estimate it must pass it through.
#[async_trait::async_trait]
pub trait FusionEngine: Send + Sync {
    fn name(&self) -> &'static str;

    async fn initialize(&self) -> Result<(), FusionError> {
        Ok(())
    }

    async fn fuse(
        &self,
        text: &ModalityEstimate,
        audio: Option<&ModalityEstimate>,
        visual: Option<&ModalityEstimate>,
        context: Option<&AnalysisContext>,
    ) -> FusionOutcome;
}

// ============================================================================
// Tests
// ============================================================================
