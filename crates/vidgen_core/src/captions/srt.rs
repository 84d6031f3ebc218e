//! SubRip (.srt) reading and writing.
//!
//! Narration timing arrives as an SRT of boundary cues written by the
//! synthesis tool; captions leave as an SRT of sentence or window cues.
//!
//! ```text
//! 1
//! 00:00:00,100 --> 00:00:02,350
//! Oceans cover most of Earth.
//! ```
//!
//! SRT uses millisecond timing (HH:MM:SS,mmm). Internal float milliseconds
//! are rounded to the nearest millisecond at write time.

use std::fs;
use std::path::Path;

use super::error::{CaptionError, CaptionResult};
use super::types::CaptionCue;
use crate::models::SpeechEvent;

/// Parse SRT content into speech events, in file order.
///
/// Index lines are ignored. Multi-line cue text is joined with spaces and
/// HTML entities are unescaped.
pub fn parse_srt(content: &str) -> CaptionResult<Vec<SpeechEvent>> {
    let content = content
        .trim_start_matches('\u{feff}')
        .replace("\r\n", "\n")
        .replace('\r', "\n");

    let mut events = Vec::new();
    let mut line_offset = 0;

    for block in content.split("\n\n") {
        let lines: Vec<&str> = block.trim_matches('\n').lines().collect();
        let block_lines = lines.len().max(1);

        let Some(timing_idx) = lines.iter().position(|l| l.contains("-->")) else {
            line_offset += block_lines + 1;
            continue;
        };
        let timing_line = lines[timing_idx];

        let (start_ms, end_ms) = parse_srt_timing(timing_line)
            .ok_or_else(|| CaptionError::invalid_time(line_offset + timing_idx + 1, timing_line))?;

        let text = lines[timing_idx + 1..]
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if !text.is_empty() {
            events.push(SpeechEvent::new(unescape_html(&text), start_ms, end_ms));
        }

        line_offset += block_lines + 1;
    }

    Ok(events)
}

/// Read speech events from an SRT file.
pub fn read_srt_file(path: &Path) -> CaptionResult<Vec<SpeechEvent>> {
    let content = fs::read_to_string(path).map_err(|source| CaptionError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    parse_srt(&content)
}

/// Render cues as SRT, numbered by position.
pub fn write_srt(cues: &[CaptionCue]) -> String {
    let mut output = String::new();

    for (i, cue) in cues.iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_srt_time(cue.start_ms),
            format_srt_time(cue.end_ms)
        ));
        output.push_str(&cue.text);
        output.push('\n');
    }

    output
}

/// Write cues to an SRT file.
pub fn write_srt_file(cues: &[CaptionCue], path: &Path) -> CaptionResult<()> {
    fs::write(path, write_srt(cues)).map_err(|source| CaptionError::WriteError {
        path: path.to_path_buf(),
        source,
    })
}

/// Format milliseconds as an SRT timestamp (HH:MM:SS,mmm).
pub fn format_srt_time(ms: f64) -> String {
    let ms = ms.round().max(0.0) as u64;

    let millis = ms % 1000;
    let total_secs = ms / 1000;
    let secs = total_secs % 60;
    let total_mins = total_secs / 60;
    let mins = total_mins % 60;
    let hours = total_mins / 60;

    format!("{:02}:{:02}:{:02},{:03}", hours, mins, secs, millis)
}

/// Parse `HH:MM:SS,mmm --> HH:MM:SS,mmm`.
fn parse_srt_timing(line: &str) -> Option<(f64, f64)> {
    let (start, end) = line.split_once("-->")?;
    // Some writers append position hints after the end time
    let end = end.split_whitespace().next()?;
    Some((parse_srt_time(start)?, parse_srt_time(end)?))
}

/// Parse an SRT timestamp (`HH:MM:SS,mmm` or `HH:MM:SS.mmm`) into milliseconds.
pub fn parse_srt_time(s: &str) -> Option<f64> {
    let s = s.trim().replace(',', ".");

    let mut parts = s.split(':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds_part = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let (secs, frac) = match seconds_part.split_once('.') {
        Some((secs, frac)) => (secs, frac),
        None => (seconds_part, ""),
    };
    let seconds: f64 = secs.parse().ok()?;

    // Normalize fractions of any length to milliseconds
    let milliseconds = if frac.is_empty() {
        0.0
    } else {
        let value: f64 = frac.parse().ok()?;
        value * 10f64.powi(3 - frac.len() as i32)
    };

    Some(hours * 3_600_000.0 + minutes * 60_000.0 + seconds * 1000.0 + milliseconds)
}

fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_time() {
        assert_eq!(format_srt_time(0.0), "00:00:00,000");
        assert_eq!(format_srt_time(1500.0), "00:00:01,500");
        assert_eq!(format_srt_time(1234.5), "00:00:01,235");
        assert_eq!(format_srt_time(3_600_000.0), "01:00:00,000");
        assert_eq!(format_srt_time(-5.0), "00:00:00,000");
    }

    #[test]
    fn parses_time() {
        assert!((parse_srt_time("00:00:01,500").unwrap() - 1500.0).abs() < 0.001);
        assert!((parse_srt_time("00:01:00.25").unwrap() - 60250.0).abs() < 0.001);
        assert!((parse_srt_time("00:00:00,1234567").unwrap() - 123.4567).abs() < 0.001);
        assert!(parse_srt_time("garbage").is_none());
    }

    #[test]
    fn parses_tool_output() {
        let content = "1\r\n00:00:00,100 --> 00:00:00,550\r\nOceans\r\n\r\n2\r\n00:00:00,550 --> 00:00:01,000\r\ncover &amp; protect\r\n";
        let events = parse_srt(content).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], SpeechEvent::new("Oceans", 100.0, 550.0));
        assert_eq!(events[1].text, "cover & protect");
    }

    #[test]
    fn joins_multiline_text() {
        let content = "1\n00:00:01,000 --> 00:00:04,000\nFirst half\nsecond half.\n";
        let events = parse_srt(content).unwrap();
        assert_eq!(events[0].text, "First half second half.");
    }

    #[test]
    fn bad_timing_reports_line() {
        let content = "1\n00:00:01,000 --> 00:00:02,000\nok\n\n2\n00:xx --> 00:00:03,000\nbad\n";
        let err = parse_srt(content).unwrap_err();
        assert!(matches!(err, CaptionError::InvalidTime { line: 6, .. }));
    }

    #[test]
    fn writes_numbered_blocks() {
        let cues = vec![
            CaptionCue::new(1, 0.0, 1200.0, "A."),
            CaptionCue::new(2, 1300.0, 2000.0, "B."),
        ];
        assert_eq!(
            write_srt(&cues),
            "1\n00:00:00,000 --> 00:00:01,200\nA.\n\n2\n00:00:01,300 --> 00:00:02,000\nB.\n"
        );
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subtitle.srt");
        let cues = vec![CaptionCue::new(1, 100.0, 900.0, "Hello.")];
        write_srt_file(&cues, &path).unwrap();

        let events = read_srt_file(&path).unwrap();
        assert_eq!(events, vec![SpeechEvent::new("Hello.", 100.0, 900.0)]);
    }
}
