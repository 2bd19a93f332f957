use lab_core::model::{AppSettings, AppSettingsDraft};
use sqlx::Row;

use crate::repository::StorageError;

/// Key of the single progress document row.
pub(crate) const PROGRESS_KEY: &str = "learner";

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn map_settings_row(row: &sqlx::sqlite::SqliteRow) -> Result<AppSettings, StorageError> {
    AppSettings::from_persisted(AppSettingsDraft {
        api_key: row.try_get("api_key").map_err(ser)?,
        text_model: row.try_get("text_model").map_err(ser)?,
        image_model: row.try_get("image_model").map_err(ser)?,
        base_url: row.try_get("base_url").map_err(ser)?,
    })
    .map_err(ser)
}
