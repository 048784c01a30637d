//! Modality Analyzers
//!
//! One analyzer per input channel. Each implements `ModalityAnalyzer` from
//! the `types` module and is shared read-only across concurrent analyses.
//!
//! # Analyzers
//! 1. **text_lexicon** - Keyword lexicon over the emotion categories (mandatory modality)
//! 2. **audio_prosody** - Voice energy / zero-crossing heuristics on a WAV clip
//! 3. **unavailable** - Stand-in for a modality with no model (visual by default)

pub mod audio_prosody;
pub mod text_lexicon;
pub mod unavailable;

pub use audio_prosody::ProsodyAudioAnalyzer;
pub use text_lexicon::LexiconTextAnalyzer;
pub use unavailable::UnavailableAnalyzer;

use crate::types::{Modality, ModalityAnalyzer, ModalityError};
use futures::future::try_join3;
use std::sync::Arc;
use tracing::info;

/// The three analyzers an orchestrator dispatches to
#[derive(Clone)]
pub struct AnalyzerSet {
    pub text: Arc<dyn ModalityAnalyzer>,
    pub audio: Arc<dyn ModalityAnalyzer>,
    pub visual: Arc<dyn ModalityAnalyzer>,
}

impl AnalyzerSet {
    pub fn new(
        text: Arc<dyn ModalityAnalyzer>,
        audio: Arc<dyn ModalityAnalyzer>,
        visual: Arc<dyn ModalityAnalyzer>,
    ) -> Self {
        Self { text, audio, visual }
    }

    /// Lexicon text, prosody audio, no visual model
    pub fn standard() -> Self {
        Self::new(
            Arc::new(LexiconTextAnalyzer::new()),
            Arc::new(ProsodyAudioAnalyzer::new()),
            Arc::new(UnavailableAnalyzer::new(Modality::Visual)),
        )
    }

    /// Load all analyzers concurrently; the first failure aborts startup
    pub async fn load_all(&self) -> Result<(), ModalityError> {
        try_join3(self.text.load(), self.audio.load(), self.visual.load()).await?;
        info!(
            text = self.text.name(),
            audio = self.audio.name(),
            visual = self.visual.name(),
            "Modality analyzers loaded"
        );
        Ok(())
    }
}
