//! Pexels video search (provider A).

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use serde::Deserialize;

use crate::config::FootageSettings;
use crate::footage::download::fetch_to_cache;
use crate::footage::error::{FootageError, FootageResult};
use crate::models::{ClipCandidate, ProviderKind, VideoAspect};

use super::{http_client, matches_resolution, missing_key, ApiKeys, FootageProvider};

const SEARCH_URL: &str = "https://api.pexels.com/videos/search";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    videos: Option<Vec<Video>>,
}

#[derive(Debug, Deserialize)]
struct Video {
    duration: f64,
    #[serde(default)]
    video_files: Vec<VideoFile>,
}

#[derive(Debug, Deserialize)]
struct VideoFile {
    width: Option<u32>,
    height: Option<u32>,
    link: String,
}

/// Pexels provider.
pub struct PexelsProvider {
    keys: ApiKeys,
    per_page: u32,
    search_client: reqwest::blocking::Client,
    download_client: reqwest::blocking::Client,
}

impl PexelsProvider {
    /// Create from footage settings; fails if no API key is available.
    pub fn from_settings(settings: &FootageSettings) -> FootageResult<Self> {
        let keys = ApiKeys::from_config_or_env(&settings.pexels_api_keys, "PEXELS_API_KEY");
        if keys.is_empty() {
            return Err(missing_key(ProviderKind::Pexels));
        }
        Ok(Self {
            keys,
            per_page: settings.per_page,
            search_client: http_client(Duration::from_secs(settings.search_timeout_secs))?,
            download_client: http_client(Duration::from_secs(settings.download_timeout_secs))?,
        })
    }
}

impl FootageProvider for PexelsProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Pexels
    }

    fn search(
        &self,
        term: &str,
        minimum_duration: f64,
        aspect: VideoAspect,
    ) -> FootageResult<Vec<ClipCandidate>> {
        let key = self.keys.next().ok_or_else(|| missing_key(ProviderKind::Pexels))?;
        let per_page = self.per_page.to_string();

        tracing::info!("searching videos on pexels: '{}' ({})", term, aspect);

        let response = self
            .search_client
            .get(SEARCH_URL)
            .header(reqwest::header::AUTHORIZATION, key)
            .query(&[
                ("query", term),
                ("per_page", per_page.as_str()),
                ("orientation", aspect.orientation()),
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

/// Parse a Pexels search response body.
fn parse_search_response(
    body: &str,
    term: &str,
    minimum_duration: f64,
    aspect: VideoAspect,
) -> FootageResult<Vec<ClipCandidate>> {
    let response: SearchResponse = serde_json::from_str(body)
        .map_err(|e| FootageError::search(term, format!("invalid response: {}", e)))?;

    let videos = response.videos.ok_or_else(|| {
        let preview: String = body.chars().take(200).collect();
        FootageError::search(term, format!("response has no videos: {}", preview))
    })?;

    tracing::info!("pexels search for '{}' returned {} raw videos", term, videos.len());

    let candidates = videos
        .into_iter()
        .filter(|v| v.duration >= minimum_duration)
        .filter_map(|v| {
            let duration = v.duration;
            v.video_files
                .into_iter()
                .find(|f| matches_resolution(f.width, f.height, aspect))
                .map(|f| {
                    let (w, h) = aspect.resolution();
                    ClipCandidate::new(ProviderKind::Pexels, f.link, duration).with_resolution(w, h)
                })
        })
        .collect();

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "page": 1,
        "videos": [
            {"duration": 12, "video_files": [
                {"width": 720, "height": 1280, "link": "https://p/1-sd.mp4"},
                {"width": 1080, "height": 1920, "link": "https://p/1-hd.mp4"}
            ]},
            {"duration": 3, "video_files": [
                {"width": 1080, "height": 1920, "link": "https://p/2-hd.mp4"}
            ]},
            {"duration": 20, "video_files": [
                {"width": null, "height": null, "link": "https://p/3-hls"},
                {"width": 1920, "height": 1080, "link": "https://p/3-hd.mp4"}
            ]}
        ]
    }"#;

    #[test]
    fn keeps_matching_resolution_and_duration() {
        let clips = parse_search_response(BODY, "ocean", 5.0, VideoAspect::Portrait).unwrap();
        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].source_url, "https://p/1-hd.mp4");
        assert_eq!(clips[0].duration, 12.0);
        assert_eq!((clips[0].width, clips[0].height), (1080, 1920));
    }

    #[test]
    fn landscape_picks_other_files() {
        let clips = parse_search_response(BODY, "ocean", 5.0, VideoAspect::Landscape).unwrap();
        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].source_url, "https://p/3-hd.mp4");
    }

    #[test]
    fn error_body_is_a_search_failure() {
        let err = parse_search_response(r#"{"error": "bad key"}"#, "ocean", 5.0, VideoAspect::Portrait)
            .unwrap_err();
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("bad key"));
    }
}
