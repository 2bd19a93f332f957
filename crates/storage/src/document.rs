//! JSON codec for the stored progress document.

use lab_core::model::ProgressRecord;
use tracing::warn;

use crate::repository::StorageError;

/// Decode a stored progress document.
///
/// Malformed documents are logged and replaced by an empty record; they are never
/// an error for the caller.
pub(crate) fn decode_progress(raw: &str) -> ProgressRecord {
    match serde_json::from_str(raw) {
        Ok(record) => record,
        Err(err) => {
            warn!(error = %err, "discarding malformed progress document");
            ProgressRecord::default()
        }
    }
}

pub(crate) fn encode_progress(record: &ProgressRecord) -> Result<String, StorageError> {
    serde_json::to_string(record).map_err(|err| StorageError::Serialization(err.to_string()))
}
