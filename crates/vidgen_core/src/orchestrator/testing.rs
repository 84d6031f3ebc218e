//! In-process collaborators and contexts for step tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::Settings;
use crate::footage::download::cache_file_name;
use crate::footage::{FootageError, FootageProvider, FootageResult};
use crate::jobs::JobLayout;
use crate::logging::{init_test_tracing, JobLogger, LogConfig};
use crate::models::{ClipCandidate, JobSpec, ProviderKind, SpeechEvent, VideoAspect};
use crate::narration::{Narration, NarrationError, NarrationResult, NarrationSynthesizer, SynthesisRequest};
use crate::render::{RenderError, RenderRequest, RenderResult, Renderer};
use crate::script::{ScriptError, ScriptGenerator, ScriptResult};

use super::types::{Collaborators, Context, JobState, NarrationOutput, ScriptOutput};

pub const FAKE_SCRIPT: &str = "Oceans cover most of Earth. They need protection!";

/// Always answers with the same script and terms.
pub struct FakeScript;

impl ScriptGenerator for FakeScript {
    fn generate_script(&self, _topic: &str, _language: &str) -> ScriptResult<String> {
        Ok(FAKE_SCRIPT.to_string())
    }

    fn generate_terms(&self, _topic: &str, _script: &str, count: usize) -> ScriptResult<Vec<String>> {
        Ok(["ocean", "reef"].iter().take(count).map(|t| t.to_string()).collect())
    }
}

/// Never produces anything.
pub struct FailingScript;

impl ScriptGenerator for FailingScript {
    fn generate_script(&self, _topic: &str, _language: &str) -> ScriptResult<String> {
        Err(ScriptError::EmptyResponse)
    }

    fn generate_terms(&self, _topic: &str, _script: &str, _count: usize) -> ScriptResult<Vec<String>> {
        Err(ScriptError::NoTerms)
    }
}

/// One timing event per word, 400ms each. The first `failures` calls
/// return no timing events.
pub struct FakeNarrator {
    failures: u32,
    calls: AtomicU32,
}

impl FakeNarrator {
    pub fn failing(failures: u32) -> Self {
        Self {
            failures,
            calls: AtomicU32::new(0),
        }
    }
}

impl Default for FakeNarrator {
    fn default() -> Self {
        Self::failing(0)
    }
}

impl NarrationSynthesizer for FakeNarrator {
    fn synthesize(&self, request: &SynthesisRequest, audio_path: &Path) -> NarrationResult<Narration> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(NarrationError::NoTimingEvents);
        }
        if let Some(parent) = audio_path.parent() {
            fs::create_dir_all(parent).map_err(|_| NarrationError::MissingAudio(audio_path.to_path_buf()))?;
        }
        fs::write(audio_path, b"ID3").map_err(|_| NarrationError::MissingAudio(audio_path.to_path_buf()))?;

        let events = request
            .text
            .split_whitespace()
            .enumerate()
            .map(|(i, word)| {
                let text = if i == 0 { word.to_string() } else { format!(" {}", word) };
                SpeechEvent::new(text, i as f64 * 400.0, (i + 1) as f64 * 400.0)
            })
            .collect();
        Ok(Narration {
            audio_path: audio_path.to_path_buf(),
            events,
        })
    }
}

/// Returns `count` distinct clips of `duration` seconds per search term.
pub struct StaticProvider {
    count: usize,
    duration: f64,
}

impl StaticProvider {
    pub fn new(count: usize, duration: f64) -> Self {
        Self { count, duration }
    }
}

impl FootageProvider for StaticProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Pexels
    }

    fn search(&self, term: &str, _minimum_duration: f64, aspect: VideoAspect) -> FootageResult<Vec<ClipCandidate>> {
        let (w, h) = aspect.resolution();
        Ok((0..self.count)
            .map(|i| {
                ClipCandidate::new(
                    ProviderKind::Pexels,
                    format!("https://stock.example/{}/{}.mp4", term, i),
                    self.duration,
                )
                .with_resolution(w, h)
            })
            .collect())
    }

    fn download(&self, candidate: &ClipCandidate, dest_dir: &Path, cancel: &AtomicBool) -> FootageResult<PathBuf> {
        if cancel.load(Ordering::SeqCst) {
            return Err(FootageError::Cancelled);
        }
        fs::create_dir_all(dest_dir).map_err(|e| FootageError::io("creating clip dir", e))?;
        let path = dest_dir.join(cache_file_name(&candidate.source_url));
        fs::write(&path, b"clip").map_err(|e| FootageError::io("writing clip", e))?;
        Ok(path)
    }
}

/// Writes a placeholder file at the requested output path and remembers
/// every request.
#[derive(Default)]
pub struct FakeRenderer {
    requests: Arc<Mutex<Vec<RenderRequest>>>,
    fail: bool,
}

impl FakeRenderer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Arc<Mutex<Vec<RenderRequest>>> {
        Arc::clone(&self.requests)
    }
}

impl Renderer for FakeRenderer {
    fn combine(&self, request: &RenderRequest) -> RenderResult<PathBuf> {
        self.requests.lock().push(request.clone());
        if self.fail {
            return Err(RenderError::command_failed("ffmpeg", 1, "Invalid data found when processing input"));
        }
        if let Some(parent) = request.output_path.parent() {
            fs::create_dir_all(parent).map_err(|e| RenderError::io("creating output dir", e))?;
        }
        fs::write(&request.output_path, b"video").map_err(|e| RenderError::io("writing video", e))?;
        Ok(request.output_path.clone())
    }
}

pub fn fake_collaborators() -> Collaborators {
    Collaborators {
        script: Box::new(FakeScript),
        narrator: Box::new(FakeNarrator::default()),
        footage: Box::new(StaticProvider::new(20, 12.0)),
        renderer: Box::new(FakeRenderer::default()),
    }
}

pub fn test_settings(root: &Path) -> Settings {
    let mut settings = Settings::default();
    settings.paths.temp_root = root.join("temp").to_string_lossy().into_owned();
    settings.paths.output_folder = root.join("output").to_string_lossy().into_owned();
    settings.paths.logs_folder = root.join("logs").to_string_lossy().into_owned();
    settings.paths.material_directory = String::new();
    settings.render.burn_captions = false;
    settings
}

pub fn test_context(root: &Path) -> Context {
    test_context_with(root, |_, _| {})
}

/// Context with fakes, after `customize` adjusts the spec and collaborators.
pub fn test_context_with(root: &Path, customize: impl FnOnce(&mut JobSpec, &mut Collaborators)) -> Context {
    init_test_tracing();

    let settings = test_settings(root);
    let mut spec = JobSpec::new("ocean conservation");
    let mut collaborators = fake_collaborators();
    customize(&mut spec, &mut collaborators);

    let job_name = "test-job";
    let layout = JobLayout::new(&settings.paths, job_name, &settings.narration.audio_extension);
    layout.create().unwrap();
    let logger = JobLogger::new(job_name, &settings.paths.logs_folder, LogConfig::default(), None).unwrap();
    let output_dir = root.join("output").join("videogeneration-test");

    Context::new(
        spec,
        settings,
        job_name,
        layout,
        output_dir,
        Arc::new(logger),
        collaborators,
    )
}

/// State after Script and Narration, with `secs` of narration.
pub fn narrated_state(secs: f64) -> JobState {
    let mut state = JobState::new("job");
    state.script = Some(ScriptOutput {
        script: FAKE_SCRIPT.to_string(),
        terms: vec!["ocean".to_string(), "reef".to_string()],
        custom_script: false,
        custom_terms: false,
        script_fallback: false,
        terms_fallback: false,
    });
    state.narration = Some(NarrationOutput {
        audio_path: PathBuf::from("audio.mp3"),
        events: vec![SpeechEvent::new(FAKE_SCRIPT, 0.0, secs * 1000.0)],
        duration_secs: secs,
        attempts: 1,
    });
    state
}
