//! Pixabay video search (provider B).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use serde::Deserialize;

use crate::config::FootageSettings;
use crate::footage::download::fetch_to_cache;
use crate::footage::error::{FootageError, FootageResult};
use crate::models::{ClipCandidate, ProviderKind, VideoAspect};

use super::{http_client, matches_resolution, missing_key, ApiKeys, FootageProvider};

const SEARCH_URL: &str = "https://pixabay.com/api/videos/";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Option<Vec<Hit>>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    duration: f64,
    /// Keyed by quality name (large, medium, small, tiny).
    #[serde(default)]
    videos: BTreeMap<String, VideoFile>,
}

#[derive(Debug, Deserialize)]
struct VideoFile {
    url: String,
    width: Option<u32>,
    height: Option<u32>,
}

/// Pixabay provider.
pub struct PixabayProvider {
    keys: ApiKeys,
    per_page: u32,
    search_client: reqwest::blocking::Client,
    download_client: reqwest::blocking::Client,
}

impl PixabayProvider {
    /// Create from footage settings; fails if no API key is available.
    pub fn from_settings(settings: &FootageSettings) -> FootageResult<Self> {
        let keys = ApiKeys::from_config_or_env(&settings.pixabay_api_keys, "PIXABAY_API_KEY");
        if keys.is_empty() {
            return Err(missing_key(ProviderKind::Pixabay));
        }
        Ok(Self {
            keys,
            per_page: settings.per_page,
            search_client: http_client(Duration::from_secs(settings.search_timeout_secs))?,
            download_client: http_client(Duration::from_secs(settings.download_timeout_secs))?,
        })
    }
}

impl FootageProvider for PixabayProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Pixabay
    }

    fn search(
        &self,
        term: &str,
        minimum_duration: f64,
        aspect: VideoAspect,
    ) -> FootageResult<Vec<ClipCandidate>> {
        let key = self
            .keys
            .next()
            .ok_or_else(|| missing_key(ProviderKind::Pixabay))?;
        let per_page = self.per_page.to_string();

        tracing::info!("searching videos on pixabay: '{}' ({})", term, aspect);

        let response = self
            .search_client
            .get(SEARCH_URL)
            .query(&[
                ("q", term),
                ("video_type", "all"),
                ("per_page", per_page.as_str()),
                ("key", key),
            ])
            .send()
            .map_err(|e| FootageError::search(term, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| FootageError::search(term, e.to_string()))?;
        if !status.is_success() {
            return Err(FootageError::search(term, format!("HTTP {}", status)));
        }

        parse_search_response(&body, term, minimum_duration, aspect)
    }

    fn download(
        &self,
        candidate: &ClipCandidate,
        dest_dir: &Path,
        cancel: &AtomicBool,
    ) -> FootageResult<PathBuf> {
        fetch_to_cache(&self.download_client, &candidate.source_url, dest_dir, cancel)
    }
}

fn parse_search_response(
    body: &str,
    term: &str,
    minimum_duration: f64,
    aspect: VideoAspect,
) -> FootageResult<Vec<ClipCandidate>> {
    let response: SearchResponse = serde_json::from_str(body)
        .map_err(|e| FootageError::search(term, format!("invalid response: {}", e)))?;

    let hits = response.hits.ok_or_else(|| {
        let preview: String = body.chars().take(200).collect();
        FootageError::search(term, format!("response has no hits: {}", preview))
    })?;

    tracing::info!("pixabay search for '{}' returned {} raw videos", term, hits.len());

    let (w, h) = aspect.resolution();
    let candidates = hits
        .into_iter()
        .filter(|hit| hit.duration >= minimum_duration)
        .filter_map(|hit| {
            let duration = hit.duration;
            hit.videos
                .into_values()
                .find(|f| matches_resolution(f.width, f.height, aspect))
                .map(|f| ClipCandidate::new(ProviderKind::Pixabay, f.url, duration).with_resolution(w, h))
        })
        .collect();

    Ok(candidates)
}
