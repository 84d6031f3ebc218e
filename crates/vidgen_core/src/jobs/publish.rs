//! Copying finished artifacts to the output directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::models::JobMetadata;

use super::error::{JobError, JobResult};

/// Files written to the output directory.
#[derive(Debug, Clone, Default)]
pub struct PublishedFiles {
    pub videos: Vec<PathBuf>,
    pub audio: Option<PathBuf>,
    pub subtitle: Option<PathBuf>,
    pub metadata: PathBuf,
}

/// Write job metadata as pretty JSON.
pub fn write_metadata(metadata: &JobMetadata, path: &Path) -> JobResult<()> {
    let json = serde_json::to_string_pretty(metadata)?;
    fs::write(path, json).map_err(|e| JobError::io("writing metadata", path, e))
}

/// Copy rendered videos (as `video-<i>.mp4`), narration audio, the caption
/// file and the metadata into `output_dir`.
///
/// Every listed video must exist; audio and subtitle are copied when present.
pub fn publish(
    output_dir: &Path,
    videos: &[PathBuf],
    audio: Option<&Path>,
    subtitle: Option<&Path>,
    metadata: &JobMetadata,
) -> JobResult<PublishedFiles> {
    fs::create_dir_all(output_dir).map_err(|e| JobError::io("creating output directory", output_dir, e))?;

    let mut published = PublishedFiles {
        metadata: output_dir.join("script.json"),
        ..PublishedFiles::default()
    };

    for (i, video) in videos.iter().enumerate() {
        if !video.is_file() {
            return Err(JobError::MissingVideo(video.clone()));
        }
        let dest = output_dir.join(format!("video-{}.mp4", i + 1));
        copy(video, &dest)?;
        published.videos.push(dest);
    }

    if let Some(audio) = audio.filter(|p| p.is_file()) {
        let ext = audio.extension().and_then(|e| e.to_str()).unwrap_or("mp3");
        let dest = output_dir.join(format!("audio.{}", ext));
        copy(audio, &dest)?;
        published.audio = Some(dest);
    }

    if let Some(subtitle) = subtitle.filter(|p| p.is_file()) {
        let dest = output_dir.join("subtitle.srt");
        copy(subtitle, &dest)?;
        published.subtitle = Some(dest);
    }

    write_metadata(metadata, &published.metadata)?;
    Ok(published)
}

fn copy(from: &Path, to: &Path) -> JobResult<()> {
    fs::copy(from, to).map_err(|e| JobError::io("copying artifact", from, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProviderKind;

    fn metadata() -> JobMetadata {
        JobMetadata {
            topic: "bees".to_string(),
            script: "Bees dance.".to_string(),
            terms: vec!["bees".to_string()],
            custom_script: true,
            custom_terms: false,
            source: ProviderKind::Pexels,
            caption_strategy: Some("sentence-aligned".to_string()),
            generated_at: "2024-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn copies_artifacts() {
        let work = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let video = work.path().join("final-1.mp4");
        let audio = work.path().join("audio.mp3");
        fs::write(&video, b"video").unwrap();
        fs::write(&audio, b"audio").unwrap();

        let dest = out.path().join("videogeneration-20240101-000000");
        let published = publish(&dest, &[video], Some(audio.as_path()), None, &metadata()).unwrap();

        assert_eq!(published.videos, vec![dest.join("video-1.mp4")]);
        assert_eq!(published.audio, Some(dest.join("audio.mp3")));
        assert!(published.subtitle.is_none());

        let json = fs::read_to_string(dest.join("script.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["topic"], "bees");
        assert_eq!(value["caption_strategy"], "sentence-aligned");
    }

    #[test]
    fn missing_video_is_error() {
        let out = tempfile::tempdir().unwrap();
        let err = publish(out.path(), &[PathBuf::from("/no/final-1.mp4")], None, None, &metadata()).unwrap_err();
        assert!(matches!(err, JobError::MissingVideo(_)));
    }
}
