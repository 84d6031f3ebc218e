//! Budgeted fetcher: search until enough footage is known, then download
//! until enough footage is on disk.
//!
//! States move `Searching -> Downloading -> Sufficient | Exhausted`. Search
//! and download failures for single terms or clips are logged and skipped;
//! only a pool that yields zero downloaded clips is an error.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::FootageSettings;
use crate::models::{ClipCandidate, ConcatMode, DownloadedClip, VideoAspect};

use super::error::{FootageError, FootageResult};
use super::providers::FootageProvider;
use super::scorer;
use super::selection::{Offer, SelectionSet};

/// Tunables for one fetch.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub aspect: VideoAspect,
    /// Minimum clip length in seconds.
    pub minimum_duration: f64,
    /// Cap on how much of one clip counts toward the download budget.
    pub max_clip_duration: f64,
    /// Download budget as a multiple of the narration duration.
    pub redundancy_multiplier: f64,
    /// Minimum number of downloaded clips before stopping.
    pub min_unique_sources: usize,
    /// Raw found duration below `A * exploration_multiplier` triggers the
    /// fallback search.
    pub exploration_multiplier: f64,
    /// The fallback merge stops at `A * exploration * fallback_stop`.
    pub fallback_stop_multiplier: f64,
    pub diversity_threshold: f64,
    /// Apply score-based retention to each search result.
    pub quality_filter: bool,
    pub concat_mode: ConcatMode,
    /// Concurrent downloads per batch.
    pub download_workers: usize,
    /// Fixed seed for the random download order (tests, reproducible runs).
    pub shuffle_seed: Option<u64>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from_settings(&FootageSettings::default(), VideoAspect::default(), ConcatMode::default())
    }
}

impl FetchConfig {
    pub fn from_settings(settings: &FootageSettings, aspect: VideoAspect, concat_mode: ConcatMode) -> Self {
        Self {
            aspect,
            minimum_duration: settings.minimum_duration,
            max_clip_duration: settings.max_clip_duration,
            redundancy_multiplier: settings.redundancy_multiplier,
            min_unique_sources: settings.min_unique_sources,
            exploration_multiplier: settings.exploration_multiplier,
            fallback_stop_multiplier: settings.fallback_stop_multiplier,
            diversity_threshold: settings.diversity_threshold,
            quality_filter: settings.quality_filter,
            concat_mode,
            download_workers: settings.download_workers.max(1),
            shuffle_seed: None,
        }
    }

    /// Set a fixed shuffle seed (builder pattern).
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    fn validate(&self) -> FootageResult<()> {
        let multipliers = [
            ("redundancy_multiplier", self.redundancy_multiplier),
            ("exploration_multiplier", self.exploration_multiplier),
            ("fallback_stop_multiplier", self.fallback_stop_multiplier),
        ];
        for (name, value) in multipliers {
            if !value.is_finite() || value < 0.0 {
                return Err(FootageError::InvalidConfig(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if !self.minimum_duration.is_finite() || self.minimum_duration < 0.0 {
            return Err(FootageError::InvalidConfig(format!(
                "minimum_duration must be non-negative, got {}",
                self.minimum_duration
            )));
        }
        Ok(())
    }
}

/// What to fetch footage for.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// Narration duration in seconds (`A`).
    pub audio_duration: f64,
    /// Primary search terms, searched in order.
    pub terms: Vec<String>,
    /// Broad search used when the primary terms find too little.
    pub fallback_subject: Option<String>,
}

/// Fetcher state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchState {
    Searching,
    Downloading,
    /// Both the duration budget and the unique source count were reached.
    Sufficient,
    /// The pool ran out before the budget was reached.
    Exhausted,
}

impl std::fmt::Display for FetchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FetchState::Searching => "searching",
            FetchState::Downloading => "downloading",
            FetchState::Sufficient => "sufficient",
            FetchState::Exhausted => "exhausted",
        };
        write!(f, "{}", s)
    }
}

/// Outcome of a fetch.
#[derive(Debug, Clone)]
pub struct FetchReport {
    /// `Sufficient` or `Exhausted`.
    pub state: FetchState,
    /// Every accepted candidate, in acceptance order.
    pub selected: Vec<ClipCandidate>,
    /// Successfully fetched clips, in download order.
    pub downloaded: Vec<DownloadedClip>,
    /// Full duration of all accepted candidates.
    pub raw_found_duration: f64,
    /// Usable duration of all downloaded clips.
    pub downloaded_duration: f64,
    /// Duration the download pass aimed for (`A * redundancy`).
    pub required_duration: f64,
    pub failed_downloads: usize,
    pub failed_searches: usize,
    pub rejected_similar: usize,
    pub fallback_used: bool,
}

impl FetchReport {
    pub fn unique_sources(&self) -> usize {
        self.downloaded.len()
    }

    pub fn is_sufficient(&self) -> bool {
        self.state == FetchState::Sufficient
    }

    pub fn clip_paths(&self) -> Vec<PathBuf> {
        self.downloaded.iter().map(|c| c.path.clone()).collect()
    }
}

#[derive(Debug, Default)]
struct SearchStats {
    failed_searches: usize,
    rejected_similar: usize,
}

/// Drives search and download against one provider for one job.
pub struct BudgetedFetcher<'a> {
    provider: &'a dyn FootageProvider,
    config: FetchConfig,
    dest_dir: PathBuf,
    state: FetchState,
}

impl<'a> BudgetedFetcher<'a> {
    /// Create a fetcher that stores downloads in `dest_dir`.
    pub fn new(provider: &'a dyn FootageProvider, config: FetchConfig, dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            config,
            dest_dir: dest_dir.into(),
            state: FetchState::Searching,
        }
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    /// Run the full fetch.
    pub fn fetch(&mut self, request: &FetchRequest, cancel: &AtomicBool) -> FootageResult<FetchReport> {
        self.config.validate()?;
        if !request.audio_duration.is_finite() || request.audio_duration <= 0.0 {
            return Err(FootageError::InvalidConfig(format!(
                "narration duration must be positive, got {}",
                request.audio_duration
            )));
        }

        self.transition(FetchState::Searching);
        let mut selection = SelectionSet::new();
        let mut stats = SearchStats::default();
        let a = request.audio_duration;

        for term in &request.terms {
            check_cancel(cancel)?;
            self.discover(term, &mut selection, &mut stats, None)?;
        }

        let exploration_ceiling = a * self.config.exploration_multiplier;
        let mut fallback_used = false;
        if selection.raw_found_duration() < exploration_ceiling {
            if let Some(subject) = request.fallback_subject.as_deref().filter(|s| !s.trim().is_empty()) {
                check_cancel(cancel)?;
                tracing::info!(
                    "found {:.1}s of footage, below {:.1}s; widening search with '{}'",
                    selection.raw_found_duration(),
                    exploration_ceiling,
                    subject
                );
                let stop_at = exploration_ceiling * self.config.fallback_stop_multiplier;
                self.discover(subject, &mut selection, &mut stats, Some(stop_at))?;
                fallback_used = true;
            }
        }

        tracing::info!(
            "selected {} candidates, {:.1}s raw footage ({} rejected as too similar)",
            selection.len(),
            selection.raw_found_duration(),
            stats.rejected_similar
        );

        self.transition(FetchState::Downloading);
        let raw_found_duration = selection.raw_found_duration();
        let selected = selection.into_clips();
        let mut order = selected.clone();
        if self.config.concat_mode == ConcatMode::Random {
            let mut rng = match self.config.shuffle_seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            order.shuffle(&mut rng);
        }

        let required = a * self.config.redundancy_multiplier;
        let (downloaded, failed_downloads) = self.download_until_sufficient(&order, required, cancel)?;
        let downloaded_duration: f64 = downloaded.iter().map(|c| c.usable_duration).sum();

        let sufficient = self.is_sufficient(downloaded_duration, downloaded.len(), required);
        self.transition(if sufficient {
            FetchState::Sufficient
        } else {
            FetchState::Exhausted
        });

        if downloaded.is_empty() {
            return Err(FootageError::NothingDownloaded {
                candidates: order.len(),
            });
        }

        if sufficient {
            tracing::info!(
                "downloaded {:.1}s of usable footage from {} sources (needed {:.1}s)",
                downloaded_duration,
                downloaded.len(),
                required
            );
        } else {
            tracing::warn!(
                "candidate pool exhausted: {:.1}s from {} sources (needed {:.1}s from {})",
                downloaded_duration,
                downloaded.len(),
                required,
                self.config.min_unique_sources
            );
        }

        Ok(FetchReport {
            state: self.state,
            selected,
            downloaded,
            raw_found_duration,
            downloaded_duration,
            required_duration: required,
            failed_downloads,
            failed_searches: stats.failed_searches,
            rejected_similar: stats.rejected_similar,
            fallback_used,
        })
    }

    /// Search one term and merge results into the selection.
    ///
    /// With `stop_at`, merging stops once raw found duration reaches it.
    fn discover(
        &self,
        term: &str,
        selection: &mut SelectionSet,
        stats: &mut SearchStats,
        stop_at: Option<f64>,
    ) -> FootageResult<()> {
        let found = match self
            .provider
            .search(term, self.config.minimum_duration, self.config.aspect)
        {
            Ok(found) => found,
            Err(e) if e.is_recoverable() => {
                tracing::warn!("skipping search term '{}': {}", term, e);
                stats.failed_searches += 1;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let candidates = if self.config.quality_filter {
            scorer::rank(&found, self.config.minimum_duration)
        } else {
            found
                .into_iter()
                .filter(|c| c.duration >= self.config.minimum_duration)
                .collect()
        };

        let mut accepted = 0;
        for candidate in candidates {
            if stop_at.is_some_and(|limit| selection.raw_found_duration() >= limit) {
                tracing::debug!("fallback search reached its stop duration");
                break;
            }
            match selection.offer(candidate, self.config.diversity_threshold) {
                Offer::Accepted => accepted += 1,
                Offer::Duplicate => {}
                Offer::TooSimilar(score) => {
                    tracing::trace!("rejected candidate with diversity {:.2}", score);
                    stats.rejected_similar += 1;
                }
            }
        }

        tracing::info!(
            "term '{}': accepted {} clips, {:.1}s raw footage so far",
            term,
            accepted,
            selection.raw_found_duration()
        );
        Ok(())
    }

    /// Download in batches of `download_workers` until the budget is met or
    /// the candidates run out.
    fn download_until_sufficient(
        &self,
        order: &[ClipCandidate],
        required: f64,
        cancel: &AtomicBool,
    ) -> FootageResult<(Vec<DownloadedClip>, usize)> {
        let workers = self.config.download_workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| FootageError::InvalidConfig(format!("download pool: {}", e)))?;

        let mut downloaded: Vec<DownloadedClip> = Vec::new();
        let mut downloaded_duration = 0.0;
        let mut failed = 0;

        for batch in order.chunks(workers) {
            if self.is_sufficient(downloaded_duration, downloaded.len(), required) {
                break;
            }
            check_cancel(cancel)?;

            let results: Vec<FootageResult<PathBuf>> = pool.install(|| {
                batch
                    .par_iter()
                    .map(|candidate| self.provider.download(candidate, &self.dest_dir, cancel))
                    .collect()
            });

            for (candidate, result) in batch.iter().zip(results) {
                match result {
                    Ok(path) => {
                        let usable = candidate.usable_duration(self.config.max_clip_duration);
                        downloaded_duration += usable;
                        downloaded.push(DownloadedClip {
                            candidate: candidate.clone(),
                            path,
                            usable_duration: usable,
                        });
                    }
                    Err(FootageError::Cancelled) => return Err(FootageError::Cancelled),
                    Err(e) if e.is_recoverable() => {
                        tracing::warn!("failed to download {}: {}", candidate.source_url, e);
                        failed += 1;
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        Ok((downloaded, failed))
    }

    fn is_sufficient(&self, downloaded_duration: f64, sources: usize, required: f64) -> bool {
        downloaded_duration >= required && sources >= self.config.min_unique_sources
    }

    fn transition(&mut self, next: FetchState) {
        if self.state != next {
            tracing::debug!("fetcher {} -> {}", self.state, next);
        }
        self.state = next;
    }
}

fn check_cancel(cancel: &AtomicBool) -> FootageResult<()> {
    if cancel.load(Ordering::Relaxed) {
        Err(FootageError::Cancelled)
    } else {
        Ok(())
    }
}
