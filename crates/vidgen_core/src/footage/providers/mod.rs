//! Footage providers.
//!
//! Providers implement the `FootageProvider` trait and are created via the
//! factory function, one instance per job.
//!
//! # Available Providers
//!
//! - **Pexels**: stock video search API (provider A).
//! - **Pixabay**: stock video search API (provider B).
//! - **Local**: files on disk, durations probed with ffprobe.

mod local;
mod pexels;
mod pixabay;

pub use local::{expand_material_patterns, LocalProvider};
pub use pexels::PexelsProvider;
pub use pixabay::PixabayProvider;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use crate::config::FootageSettings;
use crate::models::{ClipCandidate, ProviderKind, VideoAspect};
use crate::render::DurationProbe;

use super::error::{FootageError, FootageResult};

/// Browser-like user agent; some CDNs refuse default client strings.
pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36";

/// A source of clip candidates.
///
/// Search and download are blocking; implementations must apply their own
/// timeouts. Providers are shared across download workers, hence `Sync`.
pub trait FootageProvider: Send + Sync {
    /// Which provider this is.
    fn kind(&self) -> ProviderKind;

    /// Search for clips matching `term` that are at least `minimum_duration`
    /// seconds long and match the aspect's resolution.
    fn search(
        &self,
        term: &str,
        minimum_duration: f64,
        aspect: VideoAspect,
    ) -> FootageResult<Vec<ClipCandidate>>;

    /// Fetch a candidate to local disk, returning the file path.
    ///
    /// Must stop early and return `FootageError::Cancelled` once `cancel`
    /// is set.
    fn download(
        &self,
        candidate: &ClipCandidate,
        dest_dir: &Path,
        cancel: &AtomicBool,
    ) -> FootageResult<PathBuf>;
}

/// Round-robin API key rotation, scoped to one provider instance.
#[derive(Debug, Default)]
pub struct ApiKeys {
    keys: Vec<String>,
    counter: AtomicUsize,
}

impl ApiKeys {
    /// Create from configured keys, dropping blanks.
    pub fn new(keys: impl IntoIterator<Item = String>) -> Self {
        Self {
            keys: keys
                .into_iter()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect(),
            counter: AtomicUsize::new(0),
        }
    }

    /// Configured keys, or the environment variable if none are configured.
    pub fn from_config_or_env(keys: &[String], env_var: &str) -> Self {
        let configured = Self::new(keys.iter().cloned());
        if !configured.is_empty() {
            return configured;
        }
        Self::new(std::env::var(env_var).ok())
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Next key in rotation.
    pub fn next(&self) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        Some(self.keys[n % self.keys.len()].as_str())
    }
}

/// Build the blocking HTTP client shared by a provider's searches or downloads.
pub(crate) fn http_client(timeout: Duration) -> FootageResult<reqwest::blocking::Client> {
    Ok(reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(30))
        .build()?)
}

/// Create the provider for a footage source.
///
/// `materials` is only consulted for `ProviderKind::Local`.
pub fn create_provider(
    kind: ProviderKind,
    settings: &FootageSettings,
    materials: &[PathBuf],
    probe: &DurationProbe,
) -> FootageResult<Box<dyn FootageProvider>> {
    match kind {
        ProviderKind::Pexels => Ok(Box::new(PexelsProvider::from_settings(settings)?)),
        ProviderKind::Pixabay => Ok(Box::new(PixabayProvider::from_settings(settings)?)),
        ProviderKind::Local => Ok(Box::new(LocalProvider::probe(materials, probe))),
    }
}

/// Keep only files whose resolution exactly matches the aspect.
pub(crate) fn matches_resolution(width: Option<u32>, height: Option<u32>, aspect: VideoAspect) -> bool {
    let (w, h) = aspect.resolution();
    width == Some(w) && height == Some(h)
}

pub(crate) fn missing_key(kind: ProviderKind) -> FootageError {
    let (env_var, config_key) = match kind {
        ProviderKind::Pixabay => ("PIXABAY_API_KEY", "pixabay_api_keys"),
        _ => ("PEXELS_API_KEY", "pexels_api_keys"),
    };
    FootageError::MissingApiKey {
        provider: kind,
        env_var,
        config_key,
    }
}
