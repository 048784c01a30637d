//! Placeholder analyzer for a modality with no loaded model

use crate::types::{AnalysisContext, Modality, ModalityAnalyzer, ModalityError, ModalityEstimate};
use async_trait::async_trait;

/// Always reports the modality as not available
///
/// The orchestrator treats this like any other optional-modality fault: the
/// modality is excluded from fusion and the analysis continues.
#[derive(Debug)]
pub struct UnavailableAnalyzer {
    modality: Modality,
}

impl UnavailableAnalyzer {
    pub fn new(modality: Modality) -> Self {
        Self { modality }
    }
}

#[async_trait]
impl ModalityAnalyzer for UnavailableAnalyzer {
    fn modality(&self) -> Modality {
        self.modality
    }

    fn name(&self) -> &'static str {
        "Unavailable"
    }

    async fn analyze(
        &self,
        _input: &str,
        _context: Option<&AnalysisContext>,
    ) -> Result<ModalityEstimate, ModalityError> {
        Err(ModalityError::NotAvailable(format!(
            "no {} model loaded",
            self.modality
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_always_not_available() {
        let analyzer = UnavailableAnalyzer::new(Modality::Visual);
        assert_eq!(analyzer.modality(), Modality::Visual);

        let result = analyzer.analyze("aGVsbG8=", None).await;
        match result {
            Err(ModalityError::NotAvailable(msg)) => assert!(msg.contains("visual")),
            other => panic!("expected NotAvailable, got {:?}", other),
        }
    }
}
