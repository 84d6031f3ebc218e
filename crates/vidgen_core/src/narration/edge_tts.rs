//! Narration through the `edge-tts` command-line tool.
//!
//! The tool writes the audio and an SRT of boundary cues; the SRT is read
//! back as the timing events.

use std::fs;
use std::path::Path;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::captions::read_srt_file;
use crate::config::NarrationSettings;
use crate::process::ToolCommand;

use super::error::{NarrationError, NarrationResult};
use super::{Narration, NarrationSynthesizer, SynthesisRequest};

static GENDER_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-(Male|Female)$").expect("gender suffix regex should compile"));

/// Synthesizer that shells out to `edge-tts`.
#[derive(Debug, Clone)]
pub struct EdgeTtsSynthesizer {
    program: String,
    timeout: Duration,
}

impl EdgeTtsSynthesizer {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub fn from_settings(settings: &NarrationSettings) -> Self {
        Self::new(&settings.program, Duration::from_secs(settings.timeout_secs))
    }

    fn command(&self, request: &SynthesisRequest, audio_path: &Path, timing_path: &Path) -> ToolCommand {
        ToolCommand::new(&self.program, self.timeout)
            .arg("--voice")
            .arg(parse_voice_name(&request.voice))
            .arg(format!("--rate={}", rate_to_percent(request.rate)))
            .arg("--text")
            .arg(request.text.as_str())
            .arg("--write-media")
            .arg(audio_path.to_string_lossy())
            .arg("--write-subtitles")
            .arg(timing_path.to_string_lossy())
    }
}

impl NarrationSynthesizer for EdgeTtsSynthesizer {
    fn synthesize(&self, request: &SynthesisRequest, audio_path: &Path) -> NarrationResult<Narration> {
        if request.text.trim().is_empty() {
            return Err(NarrationError::EmptyText);
        }

        let timing_path = audio_path.with_extension("boundaries.srt");
        // Stale output from an earlier attempt must not pass for this one
        let _ = fs::remove_file(audio_path);
        let _ = fs::remove_file(&timing_path);

        let command = self.command(request, audio_path, &timing_path);
        tracing::debug!("$ {}", command.display());

        let output = command.run()?;
        if !output.success() {
            return Err(NarrationError::command_failed(
                &self.program,
                output.code(),
                output.stderr_tail(5),
            ));
        }

        let audio_written = fs::metadata(audio_path).map(|m| m.len() > 0).unwrap_or(false);
        if !audio_written {
            return Err(NarrationError::MissingAudio(audio_path.to_path_buf()));
        }

        let events = read_srt_file(&timing_path)?;
        if events.is_empty() {
            return Err(NarrationError::NoTimingEvents);
        }

        tracing::info!(
            "narration: {} timing events, {:.1}s",
            events.len(),
            events.last().map(|e| e.end_ms / 1000.0).unwrap_or(0.0)
        );

        Ok(Narration {
            audio_path: audio_path.to_path_buf(),
            events,
        })
    }
}

/// Strip a trailing `-Male`/`-Female` from a voice name.
pub fn parse_voice_name(name: &str) -> String {
    GENDER_SUFFIX.replace(name.trim(), "").into_owned()
}

/// Format a speaking rate as the signed percentage `edge-tts` expects.
pub fn rate_to_percent(rate: f64) -> String {
    if rate == 1.0 {
        return "+0%".to_string();
    }
    let percent = ((rate - 1.0) * 100.0).round() as i64;
    if percent > 0 {
        format!("+{}%", percent)
    } else {
        format!("{}%", percent)
    }
}
