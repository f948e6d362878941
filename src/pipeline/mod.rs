pub mod library; // Scraped library layout and batch conversion
pub mod orchestrator; // Convert-and-save entry point used after layout analysis

pub use library::*;
pub use orchestrator::*;

use std::path::PathBuf;

use thiserror::Error;

use crate::convert::ValidationError;
use crate::db::PersistenceError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not write template JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Library directory not found: {0}")]
    LibraryNotFound(PathBuf),
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Storage failures may clear up on their own; bad input never does.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}
