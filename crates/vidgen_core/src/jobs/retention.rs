//! Removal of old published output directories.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDateTime};

use super::error::{JobError, JobResult};
use super::layout::parse_output_dir_name;

/// Delete output directories whose name timestamp is older than
/// `retention_days` before `now`. Returns the removed directories.
///
/// `retention_days == 0` disables cleanup. Entries whose names do not
/// carry a timestamp are left alone.
pub fn cleanup_old_outputs(base: &Path, retention_days: u32, now: NaiveDateTime) -> JobResult<Vec<PathBuf>> {
    if retention_days == 0 || !base.is_dir() {
        return Ok(Vec::new());
    }

    let cutoff = now - Duration::days(i64::from(retention_days));
    let entries = fs::read_dir(base).map_err(|e| JobError::io("listing outputs", base, e))?;

    let mut removed = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(stamp) = path.file_name().and_then(|n| n.to_str()).and_then(parse_output_dir_name) else {
            continue;
        };
        if stamp >= cutoff {
            continue;
        }

        match fs::remove_dir_all(&path) {
            Ok(()) => {
                tracing::info!("removed old output {}", path.display());
                removed.push(path);
            }
            Err(e) => tracing::warn!("could not remove {}: {}", path.display(), e),
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    #[test]
    fn removes_only_expired_named_dirs() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "videogeneration-20240101-120000",
            "videogeneration-20240109-120000",
            "videogeneration-notadate",
            "keep-me",
        ] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }
        fs::write(dir.path().join("videogeneration-20230101-000000"), b"file").unwrap();

        let removed = cleanup_old_outputs(dir.path(), 7, at(2024, 1, 10)).unwrap();

        assert_eq!(removed, vec![dir.path().join("videogeneration-20240101-120000")]);
        assert!(dir.path().join("videogeneration-20240109-120000").exists());
        assert!(dir.path().join("videogeneration-notadate").exists());
        assert!(dir.path().join("keep-me").exists());
        assert!(dir.path().join("videogeneration-20230101-000000").exists());
    }

    #[test]
    fn zero_days_disables() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("videogeneration-20000101-000000")).unwrap();
        assert!(cleanup_old_outputs(dir.path(), 0, at(2024, 1, 1)).unwrap().is_empty());
        assert!(cleanup_old_outputs(&dir.path().join("missing"), 7, at(2024, 1, 1)).unwrap().is_empty());
    }
}
