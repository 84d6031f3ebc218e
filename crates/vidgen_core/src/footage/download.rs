//! Streaming clip download into the material cache.
//!
//! Files are named `vid-<md5(url without query)>.mp4`. A non-empty cached
//! file is reused. Data streams to a `.part` file that is renamed only after
//! the transfer completes, and the cancellation flag is checked between
//! chunks so an in-flight download can be aborted.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use super::error::{FootageError, FootageResult};

const CHUNK_SIZE: usize = 64 * 1024;

/// Cache file name for a clip URL.
pub fn cache_file_name(url: &str) -> String {
    let without_query = url.split('?').next().unwrap_or(url);
    let digest = md5::compute(without_query.as_bytes());
    format!("vid-{:x}.mp4", digest)
}

/// Return the cached file for `url` if it exists and is non-empty.
pub fn cached_path(url: &str, dest_dir: &Path) -> Option<PathBuf> {
    let path = dest_dir.join(cache_file_name(url));
    match fs::metadata(&path) {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Some(path),
        _ => None,
    }
}

/// Download `url` into `dest_dir` using `client`.
pub fn fetch_to_cache(
    client: &reqwest::blocking::Client,
    url: &str,
    dest_dir: &Path,
    cancel: &AtomicBool,
) -> FootageResult<PathBuf> {
    if let Some(existing) = cached_path(url, dest_dir) {
        tracing::info!("video already exists: {}", existing.display());
        return Ok(existing);
    }

    fs::create_dir_all(dest_dir)
        .map_err(|e| FootageError::io(format!("creating {}", dest_dir.display()), e))?;

    let response = client.get(url).send()?;
    if !response.status().is_success() {
        return Err(FootageError::download(
            url,
            format!("HTTP {}", response.status()),
        ));
    }

    let final_path = dest_dir.join(cache_file_name(url));
    write_stream(response, url, &final_path, cancel)?;
    Ok(final_path)
}

/// Copy `reader` into `final_path` via a `.part` file.
pub(crate) fn write_stream(
    mut reader: impl Read,
    url: &str,
    final_path: &Path,
    cancel: &AtomicBool,
) -> FootageResult<u64> {
    let part_path = final_path.with_extension("mp4.part");
    let file = File::create(&part_path)
        .map_err(|e| FootageError::io(format!("creating {}", part_path.display()), e))?;
    let mut writer = BufWriter::new(file);

    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut written: u64 = 0;

    let outcome = loop {
        if cancel.load(Ordering::SeqCst) {
            break Err(FootageError::Cancelled);
        }
        let n = match reader.read(&mut buffer) {
            Ok(0) => break Ok(()),
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => break Err(FootageError::download(url, e.to_string())),
        };
        if let Err(e) = writer.write_all(&buffer[..n]) {
            break Err(FootageError::io(format!("writing {}", part_path.display()), e));
        }
        written += n as u64;
    };

    let outcome = outcome.and_then(|_| {
        writer
            .flush()
            .map_err(|e| FootageError::io(format!("flushing {}", part_path.display()), e))
    });
    drop(writer);

    if let Err(e) = outcome {
        let _ = fs::remove_file(&part_path);
        return Err(e);
    }

    if written == 0 {
        let _ = fs::remove_file(&part_path);
        return Err(FootageError::download(url, "empty response body"));
    }

    fs::rename(&part_path, final_path)
        .map_err(|e| FootageError::io(format!("renaming {}", part_path.display()), e))?;

    Ok(written)
}
