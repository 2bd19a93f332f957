use async_trait::async_trait;
use lab_core::model::{AiEvaluation, AppSettings, LabId, LabResult, ProgressRecord};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::document::{decode_progress, encode_progress};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persistence for the learner's progress document.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Load the stored progress.
    ///
    /// A missing or malformed document yields an empty record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only when the backend itself is unreachable.
    async fn load(&self) -> Result<ProgressRecord, StorageError>;

    /// Replace the stored progress with `record`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the document cannot be written.
    async fn save(&self, record: &ProgressRecord) -> Result<(), StorageError>;

    /// Remove all progress.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the document cannot be removed.
    async fn reset(&self) -> Result<(), StorageError>;

    /// Merge one lab result into the stored progress as a single atomic
    /// read-modify-write, returning the updated record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if reading or writing fails.
    async fn record_result(
        &self,
        lab_id: LabId,
        result: LabResult,
    ) -> Result<ProgressRecord, StorageError>;

    /// Attach an AI evaluation to an existing lab result.
    ///
    /// Returns `false` when the lab has no stored result.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if reading or writing fails.
    async fn attach_evaluation(
        &self,
        lab_id: LabId,
        evaluation: AiEvaluation,
    ) -> Result<bool, StorageError>;
}

#[async_trait]
pub trait AppSettingsRepository: Send + Sync {
    /// Fetch persisted settings, if any have been saved.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read or decode failures.
    async fn get_settings(&self) -> Result<Option<AppSettings>, StorageError>;

    /// Persist settings, replacing what was stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on write failures.
    async fn save_settings(&self, settings: &AppSettings) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Progress is kept as the raw JSON document so it decodes exactly like the
/// `SQLite` adapter does.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    progress: Arc<Mutex<Option<String>>>,
    settings: Arc<Mutex<Option<AppSettings>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repository with a raw progress document.
    #[must_use]
    pub fn with_raw_progress(raw: impl Into<String>) -> Self {
        Self {
            progress: Arc::new(Mutex::new(Some(raw.into()))),
            settings: Arc::new(Mutex::new(None)),
        }
    }

    fn update_progress<T>(
        &self,
        apply: impl FnOnce(&mut ProgressRecord) -> T,
    ) -> Result<(ProgressRecord, T), StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut record = guard.as_deref().map(decode_progress).unwrap_or_default();
        let outcome = apply(&mut record);
        *guard = Some(encode_progress(&record)?);
        Ok((record, outcome))
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn load(&self) -> Result<ProgressRecord, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.as_deref().map(decode_progress).unwrap_or_default())
    }

    async fn save(&self, record: &ProgressRecord) -> Result<(), StorageError> {
        let encoded = encode_progress(record)?;
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(encoded);
        Ok(())
    }

    async fn reset(&self) -> Result<(), StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = None;
        Ok(())
    }

    async fn record_result(
        &self,
        lab_id: LabId,
        result: LabResult,
    ) -> Result<ProgressRecord, StorageError> {
        let (record, ()) = self.update_progress(|record| record.record(lab_id, result))?;
        Ok(record)
    }

    async fn attach_evaluation(
        &self,
        lab_id: LabId,
        evaluation: AiEvaluation,
    ) -> Result<bool, StorageError> {
        let (_, attached) =
            self.update_progress(|record| record.attach_evaluation(lab_id, evaluation))?;
        Ok(attached)
    }
}

#[async_trait]
impl AppSettingsRepository for InMemoryRepository {
    async fn get_settings(&self) -> Result<Option<AppSettings>, StorageError> {
        let guard = self
            .settings
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save_settings(&self, settings: &AppSettings) -> Result<(), StorageError> {
        let mut guard = self
            .settings
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(settings.clone());
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
    pub app_settings: Arc<dyn AppSettingsRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_in_memory(InMemoryRepository::new())
    }

    #[must_use]
    pub fn from_in_memory(repo: InMemoryRepository) -> Self {
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo.clone());
        let app_settings: Arc<dyn AppSettingsRepository> = Arc::new(repo);
        Self {
            progress,
            app_settings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lab_core::model::AppSettingsDraft;
    use lab_core::time::fixed_now;

    #[tokio::test]
    async fn overwriting_a_result_replaces_its_score() {
        let repo = InMemoryRepository::new();
        repo.record_result(LabId::new(1), LabResult::new(78, "a", fixed_now()))
            .await
            .unwrap();
        let record = repo
            .record_result(LabId::new(2), LabResult::new(50, "b", fixed_now()))
            .await
            .unwrap();
        assert_eq!(record.total_score(), 128);

        let record = repo
            .record_result(LabId::new(1), LabResult::new(90, "c", fixed_now()))
            .await
            .unwrap();
        assert_eq!(record.total_score(), 140);
        assert_eq!(repo.load().await.unwrap().total_score(), 140);
    }

    #[tokio::test]
    async fn malformed_document_loads_as_empty() {
        let repo = InMemoryRepository::with_raw_progress("{\"scores\": 12");
        let record = repo.load().await.unwrap();
        assert!(record.is_empty());

        let record = repo
            .record_result(LabId::new(3), LabResult::new(60, "p", fixed_now()))
            .await
            .unwrap();
        assert_eq!(record.completed_count(), 1);
    }

    #[tokio::test]
    async fn reset_clears_everything() {
        let repo = InMemoryRepository::new();
        repo.record_result(LabId::new(3), LabResult::new(60, "p", fixed_now()))
            .await
            .unwrap();
        repo.reset().await.unwrap();
        assert!(repo.load().await.unwrap().is_empty());
        assert!(!repo
            .attach_evaluation(LabId::new(3), AiEvaluation::fallback())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn concurrent_merges_keep_every_result() {
        let repo = InMemoryRepository::new();
        let mut handles = Vec::new();
        for id in 1..=6 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.record_result(LabId::new(id), LabResult::new(50 + id, "p", fixed_now()))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        let record = repo.load().await.unwrap();
        assert_eq!(record.completed_count(), 6);
        assert_eq!(record.total_score(), 321);
    }

    #[tokio::test]
    async fn settings_round_trip() {
        let repo = InMemoryRepository::new();
        assert!(repo.get_settings().await.unwrap().is_none());
        let settings = AppSettingsDraft {
            api_key: Some("k".into()),
            ..AppSettingsDraft::default()
        }
        .validate()
        .unwrap();
        repo.save_settings(&settings).await.unwrap();
        assert_eq!(repo.get_settings().await.unwrap(), Some(settings));
    }
}
