//! Render error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::process::ProcessError;

#[derive(Error, Debug)]
pub enum RenderError {
    /// No clip with a usable duration was supplied.
    #[error("No usable clips to render")]
    NoClips,

    /// Narration length must be positive to plan segments.
    #[error("Invalid narration duration: {0}s")]
    InvalidDuration(f64),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("{tool} failed with exit code {exit_code}: {message}")]
    CommandFailed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    /// The probe ran but printed something that is not a duration.
    #[error("Could not read duration of '{path}' from probe output '{output}'")]
    ProbeOutput { path: PathBuf, output: String },

    /// The render finished without leaving an output file.
    #[error("Render produced no output at '{0}'")]
    MissingOutput(PathBuf),

    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },
}

impl RenderError {
    pub fn command_failed(tool: impl Into<String>, exit_code: i32, message: impl Into<String>) -> Self {
        Self::CommandFailed {
            tool: tool.into(),
            exit_code,
            message: message.into(),
        }
    }

    /// Output captured from a failed tool run.
    pub fn tool_output(&self) -> Option<&str> {
        match self {
            Self::CommandFailed { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }
}

pub type RenderResult<T> = Result<T, RenderError>;
