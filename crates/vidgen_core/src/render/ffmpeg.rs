//! Rendering with ffmpeg.
//!
//! One invocation per video: every segment is an input trimmed with `-t`,
//! normalized in a filter graph, concatenated, then muxed with the
//! narration. `-shortest` ends the video with the narration.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::RenderSettings;
use crate::models::TransitionMode;
use crate::process::ToolCommand;

use super::error::{RenderError, RenderResult};
use super::plan::{plan_segments, planned_duration, Segment};
use super::{RenderRequest, Renderer};

/// Longest fade-in applied at the start of a segment, in seconds.
const FADE_SECS: f64 = 0.5;

/// Renderer that shells out to ffmpeg.
#[derive(Debug, Clone)]
pub struct FfmpegRenderer {
    program: String,
    fps: u32,
    timeout: Duration,
}

impl FfmpegRenderer {
    pub fn new(program: impl Into<String>, fps: u32, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            fps: fps.max(1),
            timeout,
        }
    }

    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self::new(
            &settings.program,
            settings.fps,
            Duration::from_secs(settings.timeout_secs),
        )
    }

    /// Full ffmpeg argument list for a planned render.
    pub fn build_args(&self, request: &RenderRequest, segments: &[Segment]) -> Vec<String> {
        let mut args: Vec<String> = vec!["-y".into(), "-hide_banner".into()];

        for segment in segments {
            args.push("-t".into());
            args.push(format!("{:.3}", segment.duration));
            args.push("-i".into());
            args.push(segment.path.to_string_lossy().into_owned());
        }
        args.push("-i".into());
        args.push(request.audio_path.to_string_lossy().into_owned());

        args.push("-filter_complex".into());
        args.push(self.filter_graph(request, segments));

        let audio_map = format!("{}:a:0", segments.len());
        let fps = self.fps.to_string();
        args.extend(
            [
                "-map",
                "[vout]",
                "-map",
                audio_map.as_str(),
                "-c:v",
                "libx264",
                "-preset",
                "medium",
                "-pix_fmt",
                "yuv420p",
                "-r",
                fps.as_str(),
                "-c:a",
                "aac",
                "-b:a",
                "192k",
                "-shortest",
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        args.push(request.output_path.to_string_lossy().into_owned());
        args
    }

    fn filter_graph(&self, request: &RenderRequest, segments: &[Segment]) -> String {
        let (width, height) = request.aspect.resolution();
        let mut chains = Vec::with_capacity(segments.len() + 2);

        for (i, segment) in segments.iter().enumerate() {
            let mut chain = format!(
                "[{i}:v]scale={width}:{height}:force_original_aspect_ratio=increase,\
                 crop={width}:{height},setsar=1,fps={fps}",
                fps = self.fps
            );
            if request.transition == TransitionMode::Fade {
                let fade = FADE_SECS.min(segment.duration / 2.0);
                chain.push_str(&format!(",fade=t=in:st=0:d={:.3}", fade));
            }
            chain.push_str(&format!(",setpts=PTS-STARTPTS[v{i}]"));
            chains.push(chain);
        }

        let labels: String = (0..segments.len()).map(|i| format!("[v{i}]")).collect();
        let concat_out = if request.caption_path.is_some() { "vcat" } else { "vout" };
        chains.push(format!(
            "{labels}concat=n={}:v=1:a=0[{concat_out}]",
            segments.len()
        ));

        if let Some(captions) = request.caption_path() {
            chains.push(format!(
                "[vcat]subtitles='{}'[vout]",
                escape_filter_path(captions)
            ));
        }

        chains.join(";")
    }
}

impl Renderer for FfmpegRenderer {
    fn combine(&self, request: &RenderRequest) -> RenderResult<PathBuf> {
        let segments = plan_segments(&request.clips, request.audio_duration, request.max_clip_duration)?;
        tracing::info!(
            "rendering {} segments ({:.1}s) from {} clips to {}",
            segments.len(),
            planned_duration(&segments),
            request.clips.len(),
            request.output_path.display()
        );

        if let Some(parent) = request.output_path.parent() {
            fs::create_dir_all(parent).map_err(|e| RenderError::io("creating render directory", e))?;
        }

        let command = ToolCommand::new(&self.program, self.timeout).args(self.build_args(request, &segments));
        tracing::debug!("$ {}", command.display());

        let output = command.run()?;
        if !output.success() {
            return Err(RenderError::command_failed(
                &self.program,
                output.code(),
                output.stderr_tail(10),
            ));
        }

        let written = fs::metadata(&request.output_path).map(|m| m.len() > 0).unwrap_or(false);
        if !written {
            return Err(RenderError::MissingOutput(request.output_path.clone()));
        }

        Ok(request.output_path.clone())
    }
}

/// Quote a path for use inside a filter argument.
fn escape_filter_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "/")
        .replace(':', "\\:")
        .replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClipCandidate, DownloadedClip, ProviderKind, VideoAspect};

    fn request(transition: TransitionMode, captions: bool) -> RenderRequest {
        let clip = |n: &str| DownloadedClip {
            candidate: ClipCandidate::new(ProviderKind::Pexels, format!("https://x/{}", n), 12.0),
            path: PathBuf::from(format!("/c/{}.mp4", n)),
            usable_duration: 5.0,
        };
        RenderRequest {
            clips: vec![clip("a"), clip("b")],
            audio_path: PathBuf::from("/w/audio.mp3"),
            audio_duration: 8.0,
            caption_path: captions.then(|| PathBuf::from("/w/subtitle.srt")),
            aspect: VideoAspect::Portrait,
            transition,
            max_clip_duration: 5.0,
            output_path: PathBuf::from("/w/final-1.mp4"),
        }
    }

    #[test]
    fn args_trim_inputs_and_map_audio() {
        let renderer = FfmpegRenderer::new("ffmpeg", 30, Duration::from_secs(60));
        let req = request(TransitionMode::None, false);
        let segments = plan_segments(&req.clips, req.audio_duration, req.max_clip_duration).unwrap();
        let args = renderer.build_args(&req, &segments);

        let joined = args.join(" ");
        assert!(joined.starts_with("-y -hide_banner -t 5.000 -i /c/a.mp4 -t 3.000 -i /c/b.mp4 -i /w/audio.mp3"));
        assert!(joined.contains("-map [vout] -map 2:a:0"));
        assert!(joined.contains("-shortest"));
        assert_eq!(args.last().map(String::as_str), Some("/w/final-1.mp4"));

        let graph = &args[args.iter().position(|a| a == "-filter_complex").unwrap() + 1];
        assert!(graph.contains("[0:v]scale=1080:1920:force_original_aspect_ratio=increase,crop=1080:1920"));
        assert!(graph.ends_with("[v0][v1]concat=n=2:v=1:a=0[vout]"));
        assert!(!graph.contains("fade"));
    }

    #[test]
    fn fade_and_captions_extend_graph() {
        let renderer = FfmpegRenderer::new("ffmpeg", 25, Duration::from_secs(60));
        let req = request(TransitionMode::Fade, true);
        let segments = plan_segments(&req.clips, req.audio_duration, req.max_clip_duration).unwrap();
        let args = renderer.build_args(&req, &segments);
        let graph = &args[args.iter().position(|a| a == "-filter_complex").unwrap() + 1];

        assert!(graph.contains("fps=25,fade=t=in:st=0:d=0.500"));
        assert!(graph.contains("concat=n=2:v=1:a=0[vcat]"));
        assert!(graph.ends_with("[vcat]subtitles='/w/subtitle.srt'[vout]"));
    }

    #[test]
    fn escapes_filter_paths() {
        assert_eq!(escape_filter_path(Path::new("C:\\w\\it's.srt")), "C\\:/w/it\\'s.srt");
    }

    #[test]
    fn missing_program_fails() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = FfmpegRenderer::new("vidgen-no-such-ffmpeg", 30, Duration::from_secs(5));
        let mut req = request(TransitionMode::None, false);
        req.output_path = dir.path().join("out/final-1.mp4");
        assert!(matches!(renderer.combine(&req), Err(RenderError::Process(_))));
    }
}
