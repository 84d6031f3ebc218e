//! Footage error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::ProviderKind;

/// Errors that can occur while searching for or fetching footage.
#[derive(Error, Debug)]
pub enum FootageError {
    /// The provider needs an API key and none is configured.
    #[error("No API key configured for {provider} (set {env_var} or footage.{config_key})")]
    MissingApiKey {
        provider: ProviderKind,
        env_var: &'static str,
        config_key: &'static str,
    },

    /// A single search request failed.
    #[error("Search for '{term}' failed: {message}")]
    SearchFailed { term: String, message: String },

    /// A single clip download failed.
    #[error("Download of '{url}' failed: {message}")]
    DownloadFailed { url: String, message: String },

    /// File I/O error.
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },

    /// HTTP client error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A local material could not be used.
    #[error("Local material '{path}' is unusable: {message}")]
    LocalMaterial { path: PathBuf, message: String },

    /// The candidate pool ran dry before a single clip was downloaded.
    #[error("No footage could be downloaded ({candidates} candidates tried)")]
    NothingDownloaded { candidates: usize },

    /// Fetch was cancelled.
    #[error("Footage fetch was cancelled")]
    Cancelled,

    /// Fetch configuration is unusable.
    #[error("Invalid fetch configuration: {0}")]
    InvalidConfig(String),
}

impl FootageError {
    /// Create a search failed error.
    pub fn search(term: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SearchFailed {
            term: term.into(),
            message: message.into(),
        }
    }

    /// Create a download failed error.
    pub fn download(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DownloadFailed {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error with context.
    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Whether the fetcher may absorb this error and move on to the next
    /// search term or candidate.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::SearchFailed { .. }
                | Self::DownloadFailed { .. }
                | Self::Io { .. }
                | Self::Network(_)
                | Self::LocalMaterial { .. }
        )
    }
}

/// Result type for footage operations.
pub type FootageResult<T> = Result<T, FootageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_classification() {
        assert!(FootageError::download("u", "timeout").is_recoverable());
        assert!(FootageError::search("ocean", "HTTP 500").is_recoverable());
        assert!(!FootageError::Cancelled.is_recoverable());
        assert!(!FootageError::NothingDownloaded { candidates: 3 }.is_recoverable());
        let missing = FootageError::MissingApiKey {
            provider: ProviderKind::Pexels,
            env_var: "PEXELS_API_KEY",
            config_key: "pexels_api_keys",
        };
        assert!(!missing.is_recoverable());
        assert!(missing.to_string().contains("PEXELS_API_KEY"));
    }
}
