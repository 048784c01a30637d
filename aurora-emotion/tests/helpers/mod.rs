//! Test Helper Utilities
//!
//! Mock analyzers and fusion engines for exercising the orchestrator.

#![allow(dead_code)]

use async_trait::async_trait;
use aurora_emotion::analyzers::AnalyzerSet;
use aurora_emotion::fusion::WeightedFusionEngine;
use aurora_emotion::services::EmotionAnalyzer;
use aurora_emotion::types::{
    AnalysisContext, EmotionCategory, FusionEngine, FusionOutcome, Modality, ModalityAnalyzer,
    ModalityError, ModalityEstimate, ModalityReasoning, SecondaryEmotion,
};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Timestamp returned by [`fixed_clock`]
pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
}

pub fn fixed_clock() -> impl Fn() -> DateTime<Utc> + Send + Sync + 'static {
    fixed_time
}

/// Configurable analyzer that counts its calls
pub struct MockAnalyzer {
    modality: Modality,
    emotion: EmotionCategory,
    intensity: f32,
    confidence: f32,
    should_fail: bool,
    should_panic: bool,
    calls: AtomicUsize,
}

impl MockAnalyzer {
    pub fn new(modality: Modality, emotion: EmotionCategory, intensity: f32, confidence: f32) -> Self {
        Self {
            modality,
            emotion,
            intensity,
            confidence,
            should_fail: false,
            should_panic: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(modality: Modality) -> Self {
        Self {
            should_fail: true,
            ..Self::new(modality, EmotionCategory::Neutral, 0.0, 0.0)
        }
    }

    pub fn panicking(modality: Modality) -> Self {
        Self {
            should_panic: true,
            ..Self::new(modality, EmotionCategory::Neutral, 0.0, 0.0)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModalityAnalyzer for MockAnalyzer {
    fn modality(&self) -> Modality {
        self.modality
    }

    fn name(&self) -> &'static str {
        "Mock"
    }

    async fn analyze(
        &self,
        _input: &str,
        _context: Option<&AnalysisContext>,
    ) -> Result<ModalityEstimate, ModalityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_panic {
            panic!("mock {} analyzer panicked", self.modality);
        }
        if self.should_fail {
            return Err(ModalityError::Internal("mock failure".to_string()));
        }
        Ok(ModalityEstimate::new(
            self.emotion,
            self.intensity,
            self.confidence,
            format!("mock {} reasoning", self.modality),
        ))
    }
}

/// Text analyzer that reports joy and echoes its input as reasoning
pub struct EchoTextAnalyzer;

#[async_trait]
impl ModalityAnalyzer for EchoTextAnalyzer {
    fn modality(&self) -> Modality {
        Modality::Text
    }

    fn name(&self) -> &'static str {
        "EchoText"
    }

    async fn analyze(
        &self,
        input: &str,
        _context: Option<&AnalysisContext>,
    ) -> Result<ModalityEstimate, ModalityError> {
        Ok(ModalityEstimate::new(
            EmotionCategory::Joy,
            0.6,
            0.8,
            format!("echo: {}", input),
        ))
    }
}

/// Weighted fusion that panics when the text reasoning contains `marker`
pub struct MarkerPanicFusion {
    inner: WeightedFusionEngine,
    marker: String,
}

impl MarkerPanicFusion {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            inner: WeightedFusionEngine::default(),
            marker: marker.into(),
        }
    }
}

#[async_trait]
impl FusionEngine for MarkerPanicFusion {
    fn name(&self) -> &'static str {
        "MarkerPanicFusion"
    }

    async fn fuse(
        &self,
        text: &ModalityEstimate,
        audio: Option<&ModalityEstimate>,
        visual: Option<&ModalityEstimate>,
        context: Option<&AnalysisContext>,
    ) -> FusionOutcome {
        if text.reasoning.contains(&self.marker) {
            panic!("fusion failed on marker {}", self.marker);
        }
        self.inner.fuse(text, audio, visual, context).await
    }
}

/// Fusion engine that reports a non-finite intensity
pub struct NanFusion;

#[async_trait]
impl FusionEngine for NanFusion {
    fn name(&self) -> &'static str {
        "NanFusion"
    }

    async fn fuse(
        &self,
        text: &ModalityEstimate,
        _audio: Option<&ModalityEstimate>,
        _visual: Option<&ModalityEstimate>,
        _context: Option<&AnalysisContext>,
    ) -> FusionOutcome {
        FusionOutcome {
            emotion: text.emotion,
            intensity: f32::NAN,
            confidence: text.confidence,
            reasoning: "broken".to_string(),
            secondary_emotions: Vec::new(),
            modality_reasoning: ModalityReasoning::default(),
        }
    }
}

/// Fusion engine that echoes the text verdict and lists it again among the
/// secondaries, next to a sadness entry
pub struct PrimaryInSecondariesFusion;

#[async_trait]
impl FusionEngine for PrimaryInSecondariesFusion {
    fn name(&self) -> &'static str {
        "PrimaryInSecondariesFusion"
    }

    async fn fuse(
        &self,
        text: &ModalityEstimate,
        _audio: Option<&ModalityEstimate>,
        _visual: Option<&ModalityEstimate>,
        _context: Option<&AnalysisContext>,
    ) -> FusionOutcome {
        FusionOutcome {
            emotion: text.emotion,
            intensity: text.intensity,
            confidence: text.confidence,
            reasoning: "echo".to_string(),
            secondary_emotions: vec![
                SecondaryEmotion {
                    emotion: text.emotion,
                    intensity: 0.5,
                    confidence: 0.6,
                },
                SecondaryEmotion {
                    emotion: EmotionCategory::Sadness,
                    intensity: 0.4,
                    confidence: 0.3,
                },
            ],
            modality_reasoning: ModalityReasoning::default(),
        }
    }
}

/// Build an analyzer with a fixed clock and model version "test-model"
pub fn analyzer_with(
    text: Arc<dyn ModalityAnalyzer>,
    audio: Arc<dyn ModalityAnalyzer>,
    visual: Arc<dyn ModalityAnalyzer>,
    fusion: Arc<dyn FusionEngine>,
) -> EmotionAnalyzer {
    EmotionAnalyzer::new(AnalyzerSet::new(text, audio, visual), fusion)
        .with_model_version("test-model")
        .with_clock(fixed_clock())
}

/// Joy text, anger audio, sadness visual, weighted fusion
pub fn mock_analyzer() -> EmotionAnalyzer {
    analyzer_with(
        Arc::new(MockAnalyzer::new(Modality::Text, EmotionCategory::Joy, 0.6, 0.8)),
        Arc::new(MockAnalyzer::new(Modality::Audio, EmotionCategory::Anger, 0.9, 0.6)),
        Arc::new(MockAnalyzer::new(Modality::Visual, EmotionCategory::Sadness, 0.4, 0.5)),
        Arc::new(WeightedFusionEngine::default()),
    )
}

/// Context carrying audio and visual payloads
pub fn multimodal_context() -> AnalysisContext {
    AnalysisContext {
        audio_data: Some("audio-clip".to_string()),
        visual_data: Some("visual-frame".to_string()),
        ..Default::default()
    }
}
