//! Prosody Audio Analyzer
//!
//! Coarse arousal estimate from a voice clip.
//!
//! Input is a base64-encoded WAV file. The clip is downmixed to mono, then:
//! - RMS energy → arousal
//! - Zero-crossing rate → brightness (tense, high-pitched voice vs. dull, low voice)
//!
//! Mapping:
//! - near silence → calm, low confidence
//! - high arousal, bright → excitement
//! - high arousal, dull → anger
//! - low arousal, dull → sadness
//! - otherwise → calm
//!
//! Confidence: 0.4-0.6, growing with clip duration.

use crate::types::{
    AnalysisContext, EmotionCategory, Modality, ModalityAnalyzer, ModalityError, ModalityEstimate,
};
use async_trait::async_trait;
use base64::Engine;
use std::io::Cursor;
use tracing::debug;

/// RMS below this is treated as silence
const SILENCE_RMS: f32 = 0.01;
const HIGH_AROUSAL: f32 = 0.6;
const LOW_AROUSAL: f32 = 0.25;
const BRIGHT_ZCR: f32 = 0.5;

/// Prosodic features of one clip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProsodyFeatures {
    pub rms_energy: f32,
    pub zero_crossing_rate: f32,
    pub duration_seconds: f32,
}

/// Voice-energy audio analyzer
#[derive(Debug, Default)]
pub struct ProsodyAudioAnalyzer;

impl ProsodyAudioAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Decode a base64 WAV payload into mono samples in [-1, 1]
    pub fn decode_clip(encoded: &str) -> Result<(Vec<f32>, u32), ModalityError> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| ModalityError::Decode(format!("invalid base64: {}", e)))?;

        let mut reader = hound::WavReader::new(Cursor::new(bytes))
            .map_err(|e| ModalityError::Decode(format!("invalid WAV: {}", e)))?;
        let spec = reader.spec();

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| ModalityError::Decode(e.to_string()))?,
            hound::SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| ModalityError::Decode(e.to_string()))?
            }
        };

        let channels = spec.channels.max(1) as usize;
        let mono = interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect();

        Ok((mono, spec.sample_rate))
    }

    /// Decode a payload and compute its features
    pub fn extract_features(encoded: &str) -> Result<ProsodyFeatures, ModalityError> {
        let (samples, sample_rate) = Self::decode_clip(encoded)?;
        if samples.is_empty() {
            return Err(ModalityError::InvalidInput("audio clip has no samples".to_string()));
        }
        Ok(Self::features(&samples, sample_rate))
    }

    pub fn features(samples: &[f32], sample_rate: u32) -> ProsodyFeatures {
        ProsodyFeatures {
            rms_energy: calculate_rms_energy(samples),
            zero_crossing_rate: calculate_zero_crossing_rate(samples),
            duration_seconds: if sample_rate > 0 {
                samples.len() as f32 / sample_rate as f32
            } else {
                0.0
            },
        }
    }

    pub fn classify(features: &ProsodyFeatures) -> ModalityEstimate {
        let arousal = (features.rms_energy * 4.0).min(1.0);
        let brightness = (features.zero_crossing_rate * 4.0).min(1.0);
        let confidence = (0.4 + (features.duration_seconds / 30.0) * 0.2).min(0.6);

        let summary = format!(
            "energy {:.2}, zero-crossing rate {:.2} over {:.1}s",
            features.rms_energy, features.zero_crossing_rate, features.duration_seconds
        );

        if features.rms_energy < SILENCE_RMS {
            return ModalityEstimate::new(
                EmotionCategory::Calm,
                0.2,
                0.3,
                format!("near-silent voice ({})", summary),
            );
        }

        let (emotion, description) = if arousal >= HIGH_AROUSAL && brightness >= BRIGHT_ZCR {
            (EmotionCategory::Excitement, "loud, bright voice")
        } else if arousal >= HIGH_AROUSAL {
            (EmotionCategory::Anger, "loud, tense voice")
        } else if arousal < LOW_AROUSAL && brightness < BRIGHT_ZCR {
            (EmotionCategory::Sadness, "quiet, flat voice")
        } else {
            (EmotionCategory::Calm, "steady voice")
        };

        ModalityEstimate::new(
            emotion,
            arousal,
            confidence,
            format!("{} ({})", description, summary),
        )
    }
}

#[async_trait]
impl ModalityAnalyzer for ProsodyAudioAnalyzer {
    fn modality(&self) -> Modality {
        Modality::Audio
    }

    fn name(&self) -> &'static str {
        "ProsodyAudio"
    }

    async fn analyze(
        &self,
        input: &str,
        _context: Option<&AnalysisContext>,
    ) -> Result<ModalityEstimate, ModalityError> {
        // Decoding and feature loops are CPU-bound
        let encoded = input.to_string();
        let features = tokio::task::spawn_blocking(move || Self::extract_features(&encoded))
            .await
            .map_err(|e| ModalityError::Internal(format!("prosody task failed: {}", e)))??;

        debug!(
            rms = features.rms_energy,
            zcr = features.zero_crossing_rate,
            duration = features.duration_seconds,
            "Audio prosody features"
        );

        Ok(Self::classify(&features))
    }
}

/// Calculate RMS (Root Mean Square) energy
fn calculate_rms_energy(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Calculate Zero-Crossing Rate (crossings per sample)
fn calculate_zero_crossing_rate(samples: &[f32]) -> f32 {
    if samples.len() < 2 {
        return 0.0;
    }

    let crossings = samples
        .windows(2)
        .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
        .count();

    crossings as f32 / samples.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Encode a mono 16-bit sine wave as a base64 WAV
    fn sine_clip(frequency: f32, amplitude: f32, seconds: f32) -> String {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            let total = (spec.sample_rate as f32 * seconds) as usize;
            for n in 0..total {
                let t = n as f32 / spec.sample_rate as f32;
                let v = (2.0 * std::f32::consts::PI * frequency * t).sin() * amplitude;
                writer.write_sample((v * i16::MAX as f32) as i16).unwrap();
            }
            writer.finalize().unwrap();
        }
        base64::engine::general_purpose::STANDARD.encode(cursor.into_inner())
    }

    #[test]
    fn test_rms_of_constant_signal() {
        assert!((calculate_rms_energy(&[0.5, -0.5, 0.5, -0.5]) - 0.5).abs() < 1e-6);
        assert_eq!(calculate_rms_energy(&[]), 0.0);
    }

    #[test]
    fn test_zero_crossing_rate_alternating() {
        // 3 crossings over 4 samples
        assert!((calculate_zero_crossing_rate(&[1.0, -1.0, 1.0, -1.0]) - 0.75).abs() < 1e-6);
        assert_eq!(calculate_zero_crossing_rate(&[1.0]), 0.0);
    }

    #[tokio::test]
    async fn test_loud_high_pitch_is_excitement() {
        // 1 kHz at 8 kHz sample rate → ZCR 0.25, brightness 1.0
        let clip = sine_clip(1000.0, 0.9, 2.0);
        let e = ProsodyAudioAnalyzer::new().analyze(&clip, None).await.unwrap();
        assert_eq!(e.emotion, EmotionCategory::Excitement);
        assert!(e.intensity >= HIGH_AROUSAL);
    }

    #[tokio::test]
    async fn test_loud_low_pitch_is_anger() {
        // 100 Hz → ZCR 0.025, brightness 0.1
        let clip = sine_clip(100.0, 0.9, 2.0);
        let e = ProsodyAudioAnalyzer::new().analyze(&clip, None).await.unwrap();
        assert_eq!(e.emotion, EmotionCategory::Anger);
    }

    #[tokio::test]
    async fn test_quiet_low_pitch_is_sadness() {
        let clip = sine_clip(100.0, 0.05, 2.0);
        let e = ProsodyAudioAnalyzer::new().analyze(&clip, None).await.unwrap();
        assert_eq!(e.emotion, EmotionCategory::Sadness);
    }

    #[tokio::test]
    async fn test_silence_is_low_confidence_calm() {
        let clip = sine_clip(100.0, 0.0, 1.0);
        let e = ProsodyAudioAnalyzer::new().analyze(&clip, None).await.unwrap();
        assert_eq!(e.emotion, EmotionCategory::Calm);
        assert_eq!(e.confidence, 0.3);
    }

    #[tokio::test]
    async fn test_invalid_payload_is_decode_error() {
        let result = ProsodyAudioAnalyzer::new().analyze("not base64 at all!", None).await;
        assert!(matches!(result, Err(ModalityError::Decode(_))));

        let not_wav = base64::engine::general_purpose::STANDARD.encode(b"RIFF....garbage");
        let result = ProsodyAudioAnalyzer::new().analyze(&not_wav, None).await;
        assert!(matches!(result, Err(ModalityError::Decode(_))));
    }

    #[test]
    fn test_empty_clip_is_invalid_input() {
        let clip = sine_clip(100.0, 0.5, 0.0);
        let result = ProsodyAudioAnalyzer::extract_features(&clip);
        assert!(matches!(result, Err(ModalityError::InvalidInput(_))));
    }

    #[test]
    fn test_confidence_grows_with_duration() {
        let short = ProsodyAudioAnalyzer::classify(&ProsodyFeatures {
            rms_energy: 0.1,
            zero_crossing_rate: 0.05,
            duration_seconds: 1.0,
        });
        let long = ProsodyAudioAnalyzer::classify(&ProsodyFeatures {
            rms_energy: 0.1,
            zero_crossing_rate: 0.05,
            duration_seconds: 60.0,
        });
        assert!(long.confidence > short.confidence);
        assert_eq!(long.confidence, 0.6);
    }
}
