//! Media duration probing through ffprobe.

use std::path::Path;
use std::time::Duration;

use crate::config::RenderSettings;
use crate::process::ToolCommand;

use super::error::{RenderError, RenderResult};

const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Reads a media file's container duration.
#[derive(Debug, Clone)]
pub struct DurationProbe {
    program: String,
    timeout: Duration,
}

impl Default for DurationProbe {
    fn default() -> Self {
        Self::new("ffprobe", DEFAULT_PROBE_TIMEOUT)
    }
}

impl DurationProbe {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self::new(&settings.probe_program, DEFAULT_PROBE_TIMEOUT)
    }

    fn command(&self, path: &Path) -> ToolCommand {
        ToolCommand::new(&self.program, self.timeout)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path.to_string_lossy())
    }

    /// Duration in seconds.
    pub fn duration_secs(&self, path: &Path) -> RenderResult<f64> {
        let output = self.command(path).run()?;
        if !output.success() {
            return Err(RenderError::command_failed(
                &self.program,
                output.code(),
                output.stderr_tail(3),
            ));
        }

        parse_duration_output(&output.stdout).ok_or_else(|| RenderError::ProbeOutput {
            path: path.to_path_buf(),
            output: output.stdout.trim().to_string(),
        })
    }
}

/// First line of probe output that parses as a non-negative number.
pub fn parse_duration_output(stdout: &str) -> Option<f64> {
    stdout
        .lines()
        .map(str::trim)
        .find_map(|l| l.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
}
