use std::path::PathBuf;
use std::sync::Arc;

use lab_core::LabCatalog;
use storage::repository::Storage;
use tracing::info;

use crate::Clock;
use crate::ai::{GeminiClient, GenerativeAiClient};
use crate::app_settings_service::AppSettingsService;
use crate::documents::DocumentLoader;
use crate::error::AppServicesError;
use crate::lab_session::LabSessionService;
use crate::progress_service::ProgressService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    lab_sessions: Arc<LabSessionService>,
    progress: Arc<ProgressService>,
    app_settings: Arc<AppSettingsService>,
    ai_configured: bool,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// The Gemini client is configured from the persisted settings with
    /// environment overrides applied.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or settings loading fails.
    pub async fn new_sqlite(
        db_url: &str,
        assets_dir: impl Into<PathBuf>,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let app_settings = AppSettingsService::new(Arc::clone(&storage.app_settings));
        let settings = app_settings.load().await?;
        let ai: Arc<dyn GenerativeAiClient> = Arc::new(GeminiClient::from_settings(&settings));
        info!(ai_configured = ai.is_configured(), "services ready");
        Ok(Self::with_parts(
            &storage,
            app_settings,
            ai,
            DocumentLoader::new(assets_dir),
            clock,
        ))
    }

    /// Build services from already-constructed parts.
    #[must_use]
    pub fn with_parts(
        storage: &Storage,
        app_settings: AppSettingsService,
        ai: Arc<dyn GenerativeAiClient>,
        documents: DocumentLoader,
        clock: Clock,
    ) -> Self {
        let catalog = LabCatalog::builtin();
        let lab_sessions = LabSessionService::new(
            clock,
            catalog,
            Arc::clone(&storage.progress),
            Arc::clone(&ai),
            documents,
        );
        let progress = ProgressService::new(catalog, Arc::clone(&storage.progress), Arc::clone(&ai));

        Self {
            lab_sessions: Arc::new(lab_sessions),
            progress: Arc::new(progress),
            app_settings: Arc::new(app_settings),
            ai_configured: ai.is_configured(),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &'static LabCatalog {
        self.lab_sessions.catalog()
    }

    #[must_use]
    pub fn ai_configured(&self) -> bool {
        self.ai_configured
    }

    #[must_use]
    pub fn lab_sessions(&self) -> Arc<LabSessionService> {
        Arc::clone(&self.lab_sessions)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn app_settings(&self) -> Arc<AppSettingsService> {
        Arc::clone(&self.app_settings)
    }
}
