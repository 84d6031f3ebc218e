//! Local material files used as footage.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::footage::error::{FootageError, FootageResult};
use crate::models::{ClipCandidate, ProviderKind, VideoAspect};
use crate::render::DurationProbe;

use super::FootageProvider;

/// Provider backed by files already on disk.
///
/// Search terms are ignored; every probed file is a candidate. The renderer
/// scales and crops, so resolution is not filtered here.
#[derive(Debug, Default)]
pub struct LocalProvider {
    clips: Vec<ClipCandidate>,
}

impl LocalProvider {
    /// Probe each file's duration. Files that cannot be probed are skipped.
    pub fn probe(paths: &[PathBuf], probe: &DurationProbe) -> Self {
        let mut clips = Vec::with_capacity(paths.len());

        for path in paths {
            match probe.duration_secs(path) {
                Ok(duration) if duration > 0.0 => {
                    clips.push(ClipCandidate::new(
                        ProviderKind::Local,
                        path.to_string_lossy(),
                        duration,
                    ));
                }
                Ok(_) => {
                    tracing::warn!("skipping local material {}: zero duration", path.display());
                }
                Err(e) => {
                    tracing::warn!("skipping local material {}: {}", path.display(), e);
                }
            }
        }

        tracing::info!("{} of {} local materials usable", clips.len(), paths.len());
        Self { clips }
    }

    /// Use already-known candidates.
    pub fn from_candidates(clips: Vec<ClipCandidate>) -> Self {
        Self { clips }
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

impl FootageProvider for LocalProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Local
    }

    fn search(
        &self,
        _term: &str,
        minimum_duration: f64,
        _aspect: VideoAspect,
    ) -> FootageResult<Vec<ClipCandidate>> {
        Ok(self
            .clips
            .iter()
            .filter(|c| c.duration >= minimum_duration)
            .cloned()
            .collect())
    }

    fn download(
        &self,
        candidate: &ClipCandidate,
        _dest_dir: &Path,
        cancel: &AtomicBool,
    ) -> FootageResult<PathBuf> {
        if cancel.load(Ordering::Relaxed) {
            return Err(FootageError::Cancelled);
        }
        let path = PathBuf::from(&candidate.source_url);
        if path.is_file() {
            Ok(path)
        } else {
            Err(FootageError::LocalMaterial {
                path,
                message: "file no longer exists".to_string(),
            })
        }
    }
}

/// Expand user-supplied material paths and glob patterns.
///
/// A leading `~` resolves to the home directory. Patterns matching nothing
/// and missing plain paths are logged and dropped. Order is preserved and
/// duplicates removed.
pub fn expand_material_patterns(patterns: &[String]) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = Vec::new();

    for raw in patterns {
        let pattern = expand_home(raw.trim());
        if pattern.is_empty() {
            continue;
        }

        if is_glob(&pattern) {
            let matches = match glob::glob(&pattern) {
                Ok(paths) => paths.filter_map(Result::ok).filter(|p| p.is_file()).collect::<Vec<_>>(),
                Err(e) => {
                    tracing::warn!("invalid material pattern '{}': {}", pattern, e);
                    continue;
                }
            };
            if matches.is_empty() {
                tracing::warn!("material pattern '{}' matched no files", pattern);
            }
            for path in matches {
                if !out.contains(&path) {
                    out.push(path);
                }
            }
        } else {
            let path = PathBuf::from(&pattern);
            if !path.is_file() {
                tracing::warn!("material file not found: {}", path.display());
                continue;
            }
            if !out.contains(&path) {
                out.push(path);
            }
        }
    }

    out
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

fn expand_home(path: &str) -> String {
    if let Some(rest) = path.strip_prefix('~') {
        if rest.is_empty() || rest.starts_with('/') {
            if let Some(home) = dirs::home_dir() {
                return format!("{}{}", home.display(), rest);
            }
        }
    }
    path.to_string()
}
