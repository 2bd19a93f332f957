use std::sync::Arc;

use lab_core::model::{AppSettings, AppSettingsDraft};
use storage::repository::AppSettingsRepository;

use crate::ai::{GeminiClient, GenerativeAiClient};
use crate::error::{AiClientError, AppSettingsServiceError};

#[derive(Clone)]
pub struct AppSettingsService {
    repo: Arc<dyn AppSettingsRepository>,
}

impl AppSettingsService {
    #[must_use]
    pub fn new(repo: Arc<dyn AppSettingsRepository>) -> Self {
        Self { repo }
    }

    /// Load persisted settings (or defaults if missing).
    ///
    /// # Errors
    ///
    /// Returns `AppSettingsServiceError` on storage failures.
    pub async fn load(&self) -> Result<AppSettings, AppSettingsServiceError> {
        let settings = self.repo.get_settings().await?;
        Ok(settings.unwrap_or_default())
    }

    /// Validate and persist new settings.
    ///
    /// # Errors
    ///
    /// Returns `AppSettingsServiceError` if validation fails or persistence fails.
    pub async fn save(
        &self,
        draft: AppSettingsDraft,
    ) -> Result<AppSettings, AppSettingsServiceError> {
        let settings = draft.validate()?;
        self.repo.save_settings(&settings).await?;
        Ok(settings)
    }

    /// Check the stored key (plus environment overrides) against the models endpoint.
    ///
    /// # Errors
    ///
    /// Returns `AppSettingsServiceError` if settings cannot be read; the
    /// connection outcome itself is the inner result.
    pub async fn test_connection(
        &self,
    ) -> Result<Result<(), AiClientError>, AppSettingsServiceError> {
        let settings = self.load().await?;
        let client = GeminiClient::from_settings(&settings);
        Ok(client.test_connection().await)
    }
}
