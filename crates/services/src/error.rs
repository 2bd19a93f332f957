//! Shared error types for the services crate.

use thiserror::Error;

use lab_core::model::{AppSettingsError, LabId};
use lab_core::session::SessionError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors returned by a `GenerativeAiClient`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AiClientError {
    #[error("Gemini API key not configured. Please add it in Settings.")]
    Unconfigured,
    #[error("Invalid API key")]
    Unauthorized,
    #[error("{message}")]
    RequestFailed {
        status: Option<reqwest::StatusCode>,
        message: String,
    },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for AiClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return AiClientError::RequestFailed {
                status: None,
                message: "Request timed out".to_string(),
            };
        }
        AiClientError::RequestFailed {
            status: err.status(),
            message: format!("Connection failed: {err}"),
        }
    }
}

/// Errors emitted by `LabSessionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LabSessionError {
    #[error("unknown lab {0}")]
    UnknownLab(LabId),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `AppSettingsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppSettingsServiceError {
    #[error(transparent)]
    Validation(#[from] AppSettingsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Settings(#[from] AppSettingsServiceError),
}
