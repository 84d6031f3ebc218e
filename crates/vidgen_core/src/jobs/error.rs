//! Job filesystem errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobError {
    #[error("I/O error in {operation} at '{path}': {source}")]
    Io {
        operation: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize job metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    /// A final video listed for publishing does not exist.
    #[error("Rendered video not found: {0}")]
    MissingVideo(PathBuf),
}

impl JobError {
    pub fn io(operation: impl Into<String>, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }
}

pub type JobResult<T> = Result<T, JobError>;
