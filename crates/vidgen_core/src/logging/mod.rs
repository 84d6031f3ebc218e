//! Logging infrastructure for vidgen.
//!
//! This module provides:
//! - Per-job loggers with file + callback output
//! - Compact mode with progress filtering
//! - Tail buffer of external tool output for error diagnosis
//! - Application-wide `tracing` setup, optionally with a rolling log file
//!
//! # Example
//!
//! ```no_run
//! use vidgen_core::logging::{JobLogger, LogConfig};
//!
//! let logger = JobLogger::new("videogeneration-20240101-120000", ".logs", LogConfig::default(), None).unwrap();
//!
//! logger.phase("Narration");
//! logger.section("Voice en-US-JennyNeural");
//! logger.success("Narration synthesized");
//! ```

mod job_logger;
mod types;

pub use job_logger::{JobLogger, JobLoggerBuilder};
pub use types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the global tracing subscriber (stderr only).
///
/// `RUST_LOG` takes precedence over `default_level`. Calling this more than
/// once is harmless; later calls are ignored.
pub fn init_tracing(default_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_filter()));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .try_init();
}

/// Initialize tracing to stderr plus a daily-rolling `vidgen.log` in `logs_dir`.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the lifetime of the program.
pub fn init_tracing_with_file(default_level: LogLevel, logs_dir: impl AsRef<Path>) -> WorkerGuard {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_filter()));

    let file_appender = tracing_appender::rolling::daily(logs_dir.as_ref(), "vidgen.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .with(filter)
        .try_init();

    guard
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
