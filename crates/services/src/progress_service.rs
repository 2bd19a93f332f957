use std::sync::Arc;

use tracing::{info, warn};

use lab_core::model::ProgressRecord;
use lab_core::{CourseSummary, LabCatalog};
use storage::repository::ProgressRepository;

use crate::ai::{GenerativeAiClient, TextRequest};
use crate::error::ProgressServiceError;

/// Coaching text shown on the course results screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub text: String,
    /// `false` when the fixed fallback paragraph was used.
    pub from_ai: bool,
}

/// Stored progress plus the summary computed from it.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseReport {
    pub progress: ProgressRecord,
    pub summary: CourseSummary,
}

#[derive(Clone)]
pub struct ProgressService {
    catalog: &'static LabCatalog,
    progress: Arc<dyn ProgressRepository>,
    ai: Arc<dyn GenerativeAiClient>,
}

impl ProgressService {
    #[must_use]
    pub fn new(
        catalog: &'static LabCatalog,
        progress: Arc<dyn ProgressRepository>,
        ai: Arc<dyn GenerativeAiClient>,
    ) -> Self {
        Self {
            catalog,
            progress,
            ai,
        }
    }

    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the store is unreachable.
    pub async fn load(&self) -> Result<ProgressRecord, ProgressServiceError> {
        Ok(self.progress.load().await?)
    }

    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the store is unreachable.
    pub async fn report(&self) -> Result<CourseReport, ProgressServiceError> {
        let progress = self.progress.load().await?;
        let summary = CourseSummary::compute(self.catalog, &progress);
        Ok(CourseReport { progress, summary })
    }

    /// Personalised coaching from the text model, or the fixed fallback.
    pub async fn diagnostic(&self, report: &CourseReport) -> Diagnostic {
        let fallback = || Diagnostic {
            text: report.summary.fallback_diagnostic(),
            from_ai: false,
        };
        if !self.ai.is_configured() || report.progress.is_empty() {
            return fallback();
        }

        let prompt = report
            .summary
            .diagnostic_prompt(self.catalog, &report.progress);
        match self.ai.generate_text(TextRequest::new(&prompt)).await {
            Ok(text) if !text.trim().is_empty() => Diagnostic {
                text: text.trim().to_string(),
                from_ai: true,
            },
            Ok(_) => fallback(),
            Err(err) => {
                warn!(error = %err, "diagnostic generation failed");
                fallback()
            }
        }
    }

    /// Clear all stored results so the course can be retaken.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the store cannot be cleared.
    pub async fn reset(&self) -> Result<(), ProgressServiceError> {
        self.progress.reset().await?;
        info!("progress reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{GeneratedImage, InlineImage};
    use crate::error::AiClientError;
    use async_trait::async_trait;
    use lab_core::model::{LabId, LabResult};
    use lab_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    struct CannedText(Option<&'static str>);

    #[async_trait]
    impl GenerativeAiClient for CannedText {
        fn is_configured(&self) -> bool {
            true
        }

        async fn generate_text(&self, _request: TextRequest<'_>) -> Result<String, AiClientError> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| AiClientError::InvalidResponse("No text in response".into()))
        }

        async fn generate_image(
            &self,
            _prompt: &str,
            _input: &InlineImage,
        ) -> Result<GeneratedImage, AiClientError> {
            Err(AiClientError::Unconfigured)
        }

        async fn test_connection(&self) -> Result<(), AiClientError> {
            Ok(())
        }
    }

    async fn seeded(ai: CannedText) -> ProgressService {
        let repo = InMemoryRepository::new();
        repo.record_result(LabId::new(3), LabResult::new(78, "p", fixed_now()))
            .await
            .unwrap();
        ProgressService::new(LabCatalog::builtin(), Arc::new(repo), Arc::new(ai))
    }

    #[tokio::test]
    async fn diagnostic_comes_from_the_model_when_available() {
        let service = seeded(CannedText(Some("  Great work on lab 3.  "))).await;
        let report = service.report().await.unwrap();
        assert_eq!(report.summary.average_score, 78);

        let diagnostic = service.diagnostic(&report).await;
        assert!(diagnostic.from_ai);
        assert_eq!(diagnostic.text, "Great work on lab 3.");
    }

    #[tokio::test]
    async fn failed_diagnostic_uses_fallback() {
        let service = seeded(CannedText(None)).await;
        let report = service.report().await.unwrap();
        let diagnostic = service.diagnostic(&report).await;
        assert!(!diagnostic.from_ai);
        assert!(diagnostic.text.contains("78/100"));
    }

    #[tokio::test]
    async fn reset_empties_the_report() {
        let service = seeded(CannedText(None)).await;
        service.reset().await.unwrap();
        let report = service.report().await.unwrap();
        assert_eq!(report.summary.completed, 0);
        assert!(report.progress.is_empty());
    }
}
