//! Weighted Fusion Engine
//!
//! Merges the per-modality estimates of one analysis into a single verdict.
//!
//! # Weighted Fusion
//! For each category surfaced by any present modality:
//! - score = Σ(weight_m × confidence_m) / Σ(weight of every present modality)
//! - intensity = Σ(intensity_m × weight_m × confidence_m) / Σ(weight_m × confidence_m)
//!
//! The highest score becomes the primary emotion; ties break by modality
//! priority (text > visual > audio). Remaining categories become secondary
//! emotions, ordered the same way.
//!
//! With only the text estimate present the engine passes it through unchanged.
//!
//! # Example Calculation
//! Weights text=1.0, audio=0.7; text says joy (confidence 0.8), audio says
//! calm (confidence 0.6):
//!
//! joy  = (1.0 × 0.8) / 1.7 = 0.47
//! calm = (0.7 × 0.6) / 1.7 = 0.25

use crate::types::{
    clamp_unit, AnalysisContext, EmotionCategory, FusionEngine, FusionOutcome, Modality,
    ModalityEstimate, ModalityReasoning, SecondaryEmotion,
};
use async_trait::async_trait;
use aurora_common::config::FusionConfig;
use std::cmp::Ordering;
use tracing::debug;

/// Confidence-weighted fusion across modalities
pub struct WeightedFusionEngine {
    weights: FusionConfig,
}

impl Default for WeightedFusionEngine {
    fn default() -> Self {
        Self::new(FusionConfig::default())
    }
}

/// Accumulated evidence for one category
#[derive(Debug)]
struct Candidate {
    emotion: EmotionCategory,
    /// Σ(weight × confidence)
    support: f32,
    /// Σ(intensity × weight × confidence)
    weighted_intensity: f32,
    /// Σ(intensity), used when every contributor reports zero confidence
    raw_intensity: f32,
    modalities: Vec<Modality>,
    best_priority: u8,
}

impl Candidate {
    fn intensity(&self) -> f32 {
        if self.support > 0.0 {
            self.weighted_intensity / self.support
        } else {
            self.raw_intensity / self.modalities.len() as f32
        }
    }
}

impl WeightedFusionEngine {
    pub fn new(weights: FusionConfig) -> Self {
        Self { weights }
    }

    fn weight(&self, modality: Modality) -> f32 {
        match modality {
            Modality::Text => self.weights.text_weight,
            Modality::Visual => self.weights.visual_weight,
            Modality::Audio => self.weights.audio_weight,
        }
    }

    fn collect_candidates(&self, present: &[(Modality, &ModalityEstimate)]) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = Vec::with_capacity(present.len());

        for (modality, estimate) in present {
            let contribution = self.weight(*modality) * estimate.confidence;

            let idx = match candidates.iter().position(|c| c.emotion == estimate.emotion) {
                Some(idx) => idx,
                None => {
                    candidates.push(Candidate {
                        emotion: estimate.emotion,
                        support: 0.0,
                        weighted_intensity: 0.0,
                        raw_intensity: 0.0,
                        modalities: Vec::new(),
                        best_priority: u8::MAX,
                    });
                    candidates.len() - 1
                }
            };
            let candidate = &mut candidates[idx];

            candidate.support += contribution;
            candidate.weighted_intensity += estimate.intensity * contribution;
            candidate.raw_intensity += estimate.intensity;
            candidate.modalities.push(*modality);
            candidate.best_priority = candidate.best_priority.min(modality.priority());
        }

        candidates.sort_by(|a, b| {
            b.support
                .partial_cmp(&a.support)
                .unwrap_or(Ordering::Equal)
                .then(a.best_priority.cmp(&b.best_priority))
        });

        candidates
    }

    fn synthesize_reasoning(
        present: &[(Modality, &ModalityEstimate)],
        primary: &Candidate,
        others: &[Candidate],
    ) -> String {
        let channels = present
            .iter()
            .map(|(m, _)| m.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let supporters = primary
            .modalities
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(" and ");

        let mut reasoning = format!(
            "fused {} modalities ({}): {} indicated by {}",
            present.len(),
            channels,
            primary.emotion,
            supporters
        );

        if !others.is_empty() {
            let conflicts = others
                .iter()
                .map(|c| {
                    let sources = c
                        .modalities
                        .iter()
                        .map(|m| m.as_str())
                        .collect::<Vec<_>>()
                        .join(" and ");
                    format!("{} from {}", c.emotion, sources)
                })
                .collect::<Vec<_>>()
                .join(", ");
            reasoning.push_str(&format!(", with competing signals ({})", conflicts));
        }

        reasoning
    }
}

#[async_trait]
impl FusionEngine for WeightedFusionEngine {
    fn name(&self) -> &'static str {
        "WeightedFusion"
    }

    async fn fuse(
        &self,
        text: &ModalityEstimate,
        audio: Option<&ModalityEstimate>,
        visual: Option<&ModalityEstimate>,
        _context: Option<&AnalysisContext>,
    ) -> FusionOutcome {
        let modality_reasoning = ModalityReasoning {
            text: Some(text.reasoning.clone()),
            audio: audio.map(|e| e.reasoning.clone()),
            visual: visual.map(|e| e.reasoning.clone()),
        };

        // Priority order so that equal-score candidates keep text > visual > audio
        let present: Vec<(Modality, &ModalityEstimate)> = [
            (Modality::Text, Some(text)),
            (Modality::Visual, visual),
            (Modality::Audio, audio),
        ]
        .into_iter()
        .filter_map(|(m, e)| e.map(|e| (m, e)))
        .collect();

        if present.len() == 1 {
            debug!(emotion = %text.emotion, "Text-only fusion (pass-through)");
            return FusionOutcome {
                emotion: text.emotion,
                intensity: clamp_unit(text.intensity),
                confidence: clamp_unit(text.confidence),
                reasoning: "based on text analysis only".to_string(),
                secondary_emotions: Vec::new(),
                modality_reasoning,
            };
        }

        let total_weight: f32 = present.iter().map(|(m, _)| self.weight(*m)).sum();
        let mut candidates = self.collect_candidates(&present);
        let others = candidates.split_off(1);
        // present is non-empty, so the first candidate always exists
        let primary = &candidates[0];

        let score = |c: &Candidate| {
            if total_weight > 0.0 {
                clamp_unit(c.support / total_weight)
            } else {
                0.0
            }
        };

        let secondary_emotions = others
            .iter()
            .map(|c| SecondaryEmotion {
                emotion: c.emotion,
                intensity: clamp_unit(c.intensity()),
                confidence: score(c),
            })
            .collect();

        let reasoning = Self::synthesize_reasoning(&present, primary, &others);

        debug!(
            emotion = %primary.emotion,
            modalities = present.len(),
            secondary = others.len(),
            "Multimodal fusion complete"
        );

        FusionOutcome {
            emotion: primary.emotion,
            intensity: clamp_unit(primary.intensity()),
            confidence: score(primary),
            reasoning,
            secondary_emotions,
            modality_reasoning,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
