#![forbid(unsafe_code)]

mod document;
pub mod repository;
pub mod sqlite;

pub use repository::{
    AppSettingsRepository, InMemoryRepository, ProgressRepository, Storage, StorageError,
};
