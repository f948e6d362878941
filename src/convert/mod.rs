//! Scraped layout → template conversion.
//!
//! Pure functions only: nothing here touches storage or the filesystem.

pub mod converter;
pub mod coords;
pub mod fields;

pub use converter::*;
pub use coords::*;
pub use fields::*;

use thiserror::Error;

/// The scraped input cannot be converted. Not retryable without fixing the source data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Scraped record has no sections collection")]
    MissingSections,

    #[error("Scraped record has no slots collection")]
    MissingSlots,

    #[error("Malformed scraped record: {0}")]
    Malformed(String),
}
