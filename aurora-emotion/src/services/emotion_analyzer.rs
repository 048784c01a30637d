//! Multimodal emotion analyzer (orchestrator)
//!
//! Coordinates one analysis:
//! 1. Text analysis (always)
//! 2. Audio analysis (only if `audio_data` present)
//! 3. Visual analysis (only if `visual_data` present)
//! 4. Fusion, after all three outcomes are known
//! 5. Result assembly (reasoning trace, metadata)
//!
//! Steps 1-3 run concurrently. Analyzer faults, including panics, are turned
//! into `ModalityOutcome` values at the call site and never reach the caller.
//! Only assembly faults (and empty input) are returned as `AnalysisError`.

use crate::analyzers::AnalyzerSet;
use crate::types::{
    clamp_unit, AnalysisContext, AnalysisError, EmotionMetadata, EmotionResult, FusionEngine,
    FusionOutcome, ModalityAnalyzer, ModalityEstimate, ModalityOutcome, SecondaryEmotion,
};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Model version reported when none is configured
pub const DEFAULT_MODEL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Separator between segments of the reasoning trace
pub const REASONING_SEPARATOR: &str = "; ";

/// Used when the fusion engine returns an empty synthesis
const DEFAULT_BASE_REASONING: &str = "based on multimodal emotion analysis";

/// Source of analysis timestamps
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Multimodal emotion analyzer
///
/// Holds only read-only handles; one instance serves all concurrent requests.
pub struct EmotionAnalyzer {
    analyzers: AnalyzerSet,
    fusion: Arc<dyn FusionEngine>,
    model_version: String,
    clock: Clock,
}

impl EmotionAnalyzer {
    pub fn new(analyzers: AnalyzerSet, fusion: Arc<dyn FusionEngine>) -> Self {
        Self {
            analyzers,
            fusion,
            model_version: DEFAULT_MODEL_VERSION.to_string(),
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_model_version(mut self, model_version: impl Into<String>) -> Self {
        self.model_version = model_version.into();
        self
    }

    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    /// Load analyzers and initialize the fusion engine concurrently
    pub async fn initialize(&self) -> anyhow::Result<()> {
        let (loaded, initialized) =
            tokio::join!(self.analyzers.load_all(), self.fusion.initialize());
        loaded?;
        initialized?;
        info!(fusion = self.fusion.name(), "Emotion analyzer ready");
        Ok(())
    }

    /// Analyze one text with optional context
    ///
    /// # Errors
    /// - `EmptyText` if `text` is empty or whitespace
    /// - `Assembly` if the fusion outcome cannot form a valid result
    pub async fn analyze(
        &self,
        text: &str,
        context: Option<&AnalysisContext>,
        caller_id: Option<&str>,
    ) -> Result<EmotionResult, AnalysisError> {
        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyText);
        }

        info!(
            caller_id = ?caller_id,
            text_length = text.chars().count(),
            "Starting multimodal emotion analysis"
        );

        let audio_input = context.and_then(|c| c.audio_data.as_deref());
        let visual_input = context.and_then(|c| c.visual_data.as_deref());

        let (text_outcome, audio_outcome, visual_outcome) = tokio::join!(
            self.analyze_text(text, context),
            analyze_optional(self.analyzers.audio.as_ref(), audio_input, context),
            analyze_optional(self.analyzers.visual.as_ref(), visual_input, context),
        );

        // Text outcome is always Estimated or Degraded
        let fallback = ModalityEstimate::text_fallback();
        let text_estimate = text_outcome.estimate().unwrap_or(&fallback);

        let fused = self
            .fusion
            .fuse(
                text_estimate,
                audio_outcome.estimate(),
                visual_outcome.estimate(),
                context,
            )
            .await;

        let result = self.assemble(fused, text, context, caller_id).map_err(|e| {
            error!(caller_id = ?caller_id, error = %e, "Emotion analysis failed");
            e
        })?;

        info!(
            caller_id = ?caller_id,
            emotion = %result.emotion,
            confidence = result.confidence,
            "Multimodal emotion analysis complete"
        );

        Ok(result)
    }

    /// Analyze many texts concurrently with per-item fault isolation
    ///
    /// Output order matches input order. A failed item (error or panic) is
    /// replaced by `EmotionResult::fallback`. Missing context entries mean
    /// no context for that item.
    pub async fn batch_analyze(
        &self,
        texts: &[String],
        contexts: Option<&[Option<AnalysisContext>]>,
    ) -> Vec<EmotionResult> {
        info!(text_count = texts.len(), "Starting batch emotion analysis");

        let items = texts.iter().enumerate().map(|(index, text)| {
            let context = contexts
                .and_then(|c| c.get(index))
                .and_then(|c| c.as_ref());
            async move {
                let outcome = AssertUnwindSafe(self.analyze(text, context, None))
                    .catch_unwind()
                    .await;
                match outcome {
                    Ok(Ok(result)) => (result, true),
                    Ok(Err(e)) => {
                        error!(text_index = index, error = %e, "Batch item analysis failed");
                        (self.fallback_result(text, context), false)
                    }
                    Err(panic) => {
                        error!(
                            text_index = index,
                            error = %panic_message(panic.as_ref()),
                            "Batch item analysis panicked"
                        );
                        (self.fallback_result(text, context), false)
                    }
                }
            }
        });

        let outcomes = join_all(items).await;
        let success_count = outcomes.iter().filter(|(_, ok)| *ok).count();

        info!(
            text_count = texts.len(),
            success_count,
            "Batch emotion analysis complete"
        );

        outcomes.into_iter().map(|(result, _)| result).collect()
    }

    async fn analyze_text(&self, text: &str, context: Option<&AnalysisContext>) -> ModalityOutcome {
        match guarded_analyze(self.analyzers.text.as_ref(), text, context).await {
            Ok(estimate) => {
                debug!(
                    emotion = %estimate.emotion,
                    confidence = estimate.confidence,
                    "Text emotion analysis complete"
                );
                ModalityOutcome::Estimated(estimate)
            }
            Err(reason) => {
                error!(error = %reason, "Text emotion analysis failed, using default estimate");
                ModalityOutcome::Degraded(ModalityEstimate::text_fallback())
            }
        }
    }

    fn metadata(&self, text: &str, has_context: bool, caller_id: Option<&str>) -> EmotionMetadata {
        EmotionMetadata {
            text_length: text.chars().count(),
            has_context,
            user_id: caller_id.map(str::to_string),
            analysis_timestamp: aurora_common::time::to_rfc3339((self.clock)()),
            model_version: self.model_version.clone(),
        }
    }

    fn fallback_result(&self, text: &str, context: Option<&AnalysisContext>) -> EmotionResult {
        EmotionResult::fallback(self.metadata(text, context.is_some(), None))
    }

    fn assemble(
        &self,
        fused: FusionOutcome,
        text: &str,
        context: Option<&AnalysisContext>,
        caller_id: Option<&str>,
    ) -> Result<EmotionResult, AnalysisError> {
        if !fused.intensity.is_finite() || !fused.confidence.is_finite() {
            return Err(AnalysisError::Assembly(format!(
                "fusion produced non-finite scores (intensity {}, confidence {})",
                fused.intensity, fused.confidence
            )));
        }

        let mut secondary_emotions = Vec::with_capacity(fused.secondary_emotions.len());
        for s in &fused.secondary_emotions {
            if !s.intensity.is_finite() || !s.confidence.is_finite() {
                return Err(AnalysisError::Assembly(format!(
                    "fusion produced non-finite scores for secondary emotion {}",
                    s.emotion
                )));
            }
            if s.emotion == fused.emotion {
                continue;
            }
            secondary_emotions.push(SecondaryEmotion {
                emotion: s.emotion,
                intensity: clamp_unit(s.intensity),
                confidence: clamp_unit(s.confidence),
            });
        }

        let reasoning = build_reasoning(&fused, context);

        Ok(EmotionResult {
            emotion: fused.emotion,
            intensity: clamp_unit(fused.intensity),
            confidence: clamp_unit(fused.confidence),
            reasoning,
            secondary_emotions,
            metadata: self.metadata(text, context.is_some(), caller_id),
        })
    }
}

/// Dispatch an optional modality; absent input skips the analyzer
async fn analyze_optional(
    analyzer: &dyn ModalityAnalyzer,
    input: Option<&str>,
    context: Option<&AnalysisContext>,
) -> ModalityOutcome {
    let Some(input) = input else {
        return ModalityOutcome::Absent;
    };

    match guarded_analyze(analyzer, input, context).await {
        Ok(estimate) => {
            debug!(
                modality = %analyzer.modality(),
                emotion = %estimate.emotion,
                confidence = estimate.confidence,
                "Modality analysis complete"
            );
            ModalityOutcome::Estimated(estimate)
        }
        Err(reason) => {
            warn!(
                modality = %analyzer.modality(),
                analyzer = analyzer.name(),
                error = %reason,
                "Modality analysis failed, excluding from fusion"
            );
            ModalityOutcome::Failed(reason)
        }
    }
}

/// Run an analyzer, converting errors, panics and non-finite scores into `Err(reason)`
async fn guarded_analyze(
    analyzer: &dyn ModalityAnalyzer,
    input: &str,
    context: Option<&AnalysisContext>,
) -> Result<ModalityEstimate, String> {
    match AssertUnwindSafe(analyzer.analyze(input, context))
        .catch_unwind()
        .await
    {
        Ok(Ok(estimate))
            if !estimate.intensity.is_finite() || !estimate.confidence.is_finite() =>
        {
            Err(format!(
                "analyzer returned non-finite scores (intensity {}, confidence {})",
                estimate.intensity, estimate.confidence
            ))
        }
        Ok(Ok(estimate)) => Ok(estimate),
        Ok(Err(e)) => Err(e.to_string()),
        Err(panic) => Err(format!("analyzer panicked: {}", panic_message(panic.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Build the full reasoning trace from a fusion outcome and context
///
/// Order: base synthesis, text / voice / visual fragments, context influence.
/// Empty segments are omitted.
pub fn build_reasoning(fused: &FusionOutcome, context: Option<&AnalysisContext>) -> String {
    let base = fused.reasoning.trim();
    let mut parts = vec![if base.is_empty() {
        DEFAULT_BASE_REASONING.to_string()
    } else {
        base.to_string()
    }];

    for (modality, fragment) in fused.modality_reasoning.ordered() {
        if let Some(fragment) = fragment.map(str::trim).filter(|f| !f.is_empty()) {
            parts.push(format!("{}: {}", modality.reasoning_label(), fragment));
        }
    }

    if let Some(context) = context {
        let influence = context_influence(context);
        if !influence.is_empty() {
            parts.push(format!("context influence: {}", influence));
        }
    }

    parts.join(REASONING_SEPARATOR)
}

/// Describe how the context was taken into account
///
/// Returns an empty string when no recognized context key is present.
pub fn context_influence(context: &AnalysisContext) -> String {
    let mut influences = Vec::new();

    if let Some(messages) = context.previous_messages.as_ref().filter(|m| !m.is_empty()) {
        influences.push(format!("{} previous messages considered", messages.len()));
    }

    if let Some(style) = context
        .user_profile
        .as_ref()
        .and_then(|p| p.preferred_style.as_deref())
    {
        influences.push(format!("preferred style: {}", style));
    }

    if context.timestamp.is_some() {
        influences.push("temporal factors considered".to_string());
    }

    influences.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EmotionCategory, ModalityReasoning, UserProfile};

    fn outcome(reasoning: &str, fragments: ModalityReasoning) -> FusionOutcome {
        FusionOutcome {
            emotion: EmotionCategory::Joy,
            intensity: 0.6,
            confidence: 0.7,
            reasoning: reasoning.to_string(),
            secondary_emotions: Vec::new(),
            modality_reasoning: fragments,
        }
    }

    #[test]
    fn test_context_influence_all_fragments_in_order() {
        let ctx = AnalysisContext {
            previous_messages: Some(vec![serde_json::json!("a"), serde_json::json!("b")]),
            user_profile: Some(UserProfile {
                preferred_style: Some("gentle".to_string()),
            }),
            timestamp: Some("2024-05-01T10:00:00Z".to_string()),
            ..Default::default()
        };

        assert_eq!(
            context_influence(&ctx),
            "2 previous messages considered, preferred style: gentle, temporal factors considered"
        );
    }

    #[test]
    fn test_context_influence_empty_cases() {
        assert_eq!(context_influence(&AnalysisContext::default()), "");

        let ctx = AnalysisContext {
            previous_messages: Some(Vec::new()),
            user_profile: Some(UserProfile::default()),
            ..Default::default()
        };
        assert_eq!(context_influence(&ctx), "");
    }

    #[test]
    fn test_reasoning_orders_segments() {
        let fused = outcome(
            "fused 3 modalities",
            ModalityReasoning {
                text: Some("cheerful words".to_string()),
                audio: Some("bright voice".to_string()),
                visual: Some("smiling".to_string()),
            },
        );
        let ctx = AnalysisContext {
            timestamp: Some("now".to_string()),
            ..Default::default()
        };

        assert_eq!(
            build_reasoning(&fused, Some(&ctx)),
            "fused 3 modalities; text analysis: cheerful words; voice analysis: bright voice; \
             visual analysis: smiling; context influence: temporal factors considered"
        );
    }

    #[test]
    fn test_reasoning_skips_empty_fragments() {
        let fused = outcome(
            "",
            ModalityReasoning {
                text: Some("words".to_string()),
                audio: Some("   ".to_string()),
                visual: None,
            },
        );

        assert_eq!(
            build_reasoning(&fused, Some(&AnalysisContext::default())),
            "based on multimodal emotion analysis; text analysis: words"
        );
    }

    #[test]
    fn test_panic_message_variants() {
        let s: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(s.as_ref()), "static");
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(owned.as_ref()), "owned");
        let other: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }
}
