#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod model;
pub mod scoring;
pub mod session;
pub mod summary;
pub mod time;

pub use catalog::{CatalogError, LabCatalog};
pub use error::Error;
pub use scoring::ScoreBreakdown;
pub use session::{Instruction, LabSession, Phase, SessionError};
pub use summary::CourseSummary;
pub use time::Clock;
