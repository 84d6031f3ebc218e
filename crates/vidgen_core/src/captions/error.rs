//! Caption error types.

use std::path::PathBuf;

/// Errors that can occur while producing captions.
#[derive(Debug, thiserror::Error)]
pub enum CaptionError {
    /// Synchronization needs at least one speech event.
    #[error("No speech events to synchronize")]
    NoEvents,

    /// Every speech event was blank, so no cue has any text.
    #[error("Speech events contain no caption text")]
    NoText,

    /// Invalid or malformed time in a timing file.
    #[error("Invalid time format at line {line}: '{value}'")]
    InvalidTime { line: usize, value: String },

    #[error("Failed to read file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl CaptionError {
    pub fn invalid_time(line: usize, value: impl Into<String>) -> Self {
        Self::InvalidTime {
            line,
            value: value.into(),
        }
    }
}

pub type CaptionResult<T> = Result<T, CaptionError>;
