//! Per-job working directory layout.
//!
//! Every job gets its own working directory named by a random job ID, so
//! jobs never share intermediate files. Published output goes to a
//! timestamped folder under `output_folder`.
//!
//! ```text
//! <temp_root>/<job_id>/
//!     audio.<ext>
//!     subtitle.srt
//!     script.json
//!     final-<i>.mp4
//!     clips/            (unless a material directory is configured)
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, TimeZone};
use uuid::Uuid;

use crate::config::PathSettings;

use super::error::{JobError, JobResult};

/// Prefix of published output directories.
pub const OUTPUT_DIR_PREFIX: &str = "videogeneration-";
const OUTPUT_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";
/// Length of a formatted `OUTPUT_TIMESTAMP_FORMAT` stamp.
const OUTPUT_TIMESTAMP_LEN: usize = 15;

/// Fresh job ID, unique across jobs and processes.
pub fn new_job_id() -> String {
    Uuid::new_v4().to_string()
}

/// Paths owned by one job.
#[derive(Debug, Clone)]
pub struct JobLayout {
    work_dir: PathBuf,
    clips_dir: PathBuf,
    audio_extension: String,
}

impl JobLayout {
    /// Layout for `job_name` under the configured temp root.
    ///
    /// `material_directory`: empty keeps clips in the job's `clips/`
    /// folder, `"task"` puts them in the job folder itself, and an existing
    /// directory is used as a shared cache. A missing directory falls back
    /// to the default.
    pub fn new(paths: &PathSettings, job_name: &str, audio_extension: &str) -> Self {
        let work_dir = Path::new(&paths.temp_root).join(job_name);
        let material = paths.material_directory.trim();

        let clips_dir = match material {
            "" => work_dir.join("clips"),
            "task" => work_dir.clone(),
            dir if Path::new(dir).is_dir() => PathBuf::from(dir),
            dir => {
                tracing::warn!("material directory '{}' does not exist, using job folder", dir);
                work_dir.join("clips")
            }
        };

        Self {
            work_dir,
            clips_dir,
            audio_extension: audio_extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn clips_dir(&self) -> &Path {
        &self.clips_dir
    }

    pub fn audio_path(&self) -> PathBuf {
        self.work_dir.join(format!("audio.{}", self.audio_extension))
    }

    pub fn subtitle_path(&self) -> PathBuf {
        self.work_dir.join("subtitle.srt")
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.work_dir.join("script.json")
    }

    /// Rendered video `index` (1-based).
    pub fn video_path(&self, index: u32) -> PathBuf {
        self.work_dir.join(format!("final-{}.mp4", index))
    }

    /// Create the job and clip directories.
    pub fn create(&self) -> JobResult<()> {
        for dir in [&self.work_dir, &self.clips_dir] {
            fs::create_dir_all(dir).map_err(|e| JobError::io("creating directory", dir, e))?;
        }
        Ok(())
    }
}

/// Output directory name for a job started at `now`.
pub fn output_dir_name<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}{}", OUTPUT_DIR_PREFIX, now.format(OUTPUT_TIMESTAMP_FORMAT))
}

/// Reserve a new output directory under `output_root` for a job started
/// at `now`.
///
/// The directory is created here. When another job already owns the
/// timestamped name, a `-2`, `-3`, ... suffix is appended.
pub fn reserve_output_dir<Tz: TimeZone>(output_root: &Path, now: &DateTime<Tz>) -> JobResult<PathBuf>
where
    Tz::Offset: std::fmt::Display,
{
    fs::create_dir_all(output_root).map_err(|e| JobError::io("creating output folder", output_root, e))?;

    let base = output_dir_name(now);
    let mut suffix = 1u32;
    loop {
        let name = if suffix == 1 {
            base.clone()
        } else {
            format!("{}-{}", base, suffix)
        };
        let dir = output_root.join(name);
        match fs::create_dir(&dir) {
            Ok(()) => return Ok(dir),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => suffix += 1,
            Err(e) => return Err(JobError::io("creating output directory", &dir, e)),
        }
    }
}

/// Timestamp encoded in an output directory name (a `-<n>` suffix is
/// allowed).
pub fn parse_output_dir_name(name: &str) -> Option<NaiveDateTime> {
    let rest = name.strip_prefix(OUTPUT_DIR_PREFIX)?;
    let stamp = rest.get(..OUTPUT_TIMESTAMP_LEN)?;
    let suffix = &rest[OUTPUT_TIMESTAMP_LEN..];
    if !suffix.is_empty() {
        let n = suffix.strip_prefix('-')?;
        if n.is_empty() || !n.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }
    NaiveDateTime::parse_from_str(stamp, OUTPUT_TIMESTAMP_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn paths(temp_root: &Path, material: &str) -> PathSettings {
        PathSettings {
            temp_root: temp_root.to_string_lossy().into_owned(),
            material_directory: material.to_string(),
            ..PathSettings::default()
        }
    }

    #[test]
    fn default_layout() {
        let dir = tempfile::tempdir().unwrap();
        let layout = JobLayout::new(&paths(dir.path(), ""), "job-1", ".mp3");

        assert_eq!(layout.work_dir(), dir.path().join("job-1"));
        assert_eq!(layout.clips_dir(), dir.path().join("job-1/clips"));
        assert_eq!(layout.audio_path(), dir.path().join("job-1/audio.mp3"));
        assert_eq!(layout.video_path(2), dir.path().join("job-1/final-2.mp4"));

        layout.create().unwrap();
        assert!(layout.clips_dir().is_dir());
    }

    #[test]
    fn material_directory_modes() {
        let dir = tempfile::tempdir().unwrap();
        let shared = dir.path().join("cache");
        fs::create_dir(&shared).unwrap();

        let task = JobLayout::new(&paths(dir.path(), "task"), "j", "mp3");
        assert_eq!(task.clips_dir(), task.work_dir());

        let cached = JobLayout::new(&paths(dir.path(), &shared.to_string_lossy()), "j", "mp3");
        assert_eq!(cached.clips_dir(), shared.as_path());

        let missing = JobLayout::new(&paths(dir.path(), "/no/such/dir/vidgen"), "j", "mp3");
        assert_eq!(missing.clips_dir(), dir.path().join("j/clips"));
    }

    #[test]
    fn output_names_round_trip() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let name = output_dir_name(&at);
        assert_eq!(name, "videogeneration-20240309-140507");
        assert_eq!(parse_output_dir_name(&name), Some(at.naive_utc()));
        assert_eq!(parse_output_dir_name("videogeneration-latest"), None);
        assert_eq!(parse_output_dir_name("other-20240309-140507"), None);
        assert_eq!(parse_output_dir_name("videogeneration-20240309-140507-3"), Some(at.naive_utc()));
        assert_eq!(parse_output_dir_name("videogeneration-20240309-140507-"), None);
        assert_eq!(parse_output_dir_name("videogeneration-20240309-140507x"), None);
    }

    #[test]
    fn job_ids_are_unique() {
        assert_ne!(new_job_id(), new_job_id());
    }

    #[test]
    fn same_second_outputs_get_distinct_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();

        let first = reserve_output_dir(dir.path(), &at).unwrap();
        let second = reserve_output_dir(dir.path(), &at).unwrap();
        let third = reserve_output_dir(dir.path(), &at).unwrap();

        assert_eq!(first, dir.path().join("videogeneration-20240309-140507"));
        assert_eq!(second, dir.path().join("videogeneration-20240309-140507-2"));
        assert_eq!(third, dir.path().join("videogeneration-20240309-140507-3"));
        assert!(first.is_dir() && second.is_dir() && third.is_dir());
    }
}
