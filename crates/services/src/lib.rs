#![forbid(unsafe_code)]

pub mod ai;
pub mod app_services;
pub mod app_settings_service;
pub mod documents;
pub mod error;
pub mod lab_session;
pub mod progress_service;
pub mod timer;

pub use lab_core::Clock;

pub use ai::{GeminiClient, GeminiConfig, GenerativeAiClient};
pub use app_services::AppServices;
pub use app_settings_service::AppSettingsService;
pub use documents::{CsvTable, DocumentLoader, LabDocument};
pub use error::{
    AiClientError, AppServicesError, AppSettingsServiceError, LabSessionError,
    ProgressServiceError,
};
pub use lab_session::{LabSessionService, StepOutcome};
pub use progress_service::{CourseReport, Diagnostic, ProgressService};
pub use timer::{Countdown, Tick};
