mod app_settings;
mod evaluation;
mod ids;
mod lab;
mod progress;
mod track;

pub use app_settings::{
    AppSettings, AppSettingsDraft, AppSettingsError, DEFAULT_GEMINI_BASE_URL,
    DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL,
};
pub use evaluation::{AiEvaluation, DimensionScores, MAX_DIMENSION_SCORE};
pub use ids::{LabId, ParseIdError, TrackId};
pub use lab::{
    Difficulty, DocumentKind, DocumentRef, ImagePair, LabDefinition, LabDefinitionBuilder,
    LabError, LabType,
};
pub use progress::{LabResult, ProgressRecord, TrackProgress};
pub use track::Track;
