use thiserror::Error;

use crate::catalog::CatalogError;
use crate::model::{AppSettingsError, LabError};
use crate::session::SessionError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Lab(#[from] LabError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    AppSettings(#[from] AppSettingsError),
}
