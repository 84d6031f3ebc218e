//! Shared fakes for integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use vidgen_core::config::Settings;
use vidgen_core::footage::download::cache_file_name;
use vidgen_core::footage::{FootageError, FootageProvider, FootageResult};
use vidgen_core::models::{ClipCandidate, ProviderKind, SpeechEvent, VideoAspect};
use vidgen_core::narration::{Narration, NarrationError, NarrationResult, NarrationSynthesizer, SynthesisRequest};
use vidgen_core::orchestrator::Collaborators;
use vidgen_core::render::{RenderError, RenderRequest, RenderResult, Renderer};
use vidgen_core::script::{ScriptGenerator, ScriptResult};

pub const SCRIPT: &str = "The ocean covers most of the planet. Reefs shelter a quarter of sea life. We can still protect them.";

/// Stock library: every term returns `per_term` clips with durations
/// cycling through 6..=26 seconds.
pub struct StockLibrary {
    pub per_term: usize,
    pub downloads: Mutex<Vec<String>>,
}

impl StockLibrary {
    pub fn new(per_term: usize) -> Self {
        Self {
            per_term,
            downloads: Mutex::new(Vec::new()),
        }
    }
}

impl FootageProvider for StockLibrary {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Pixabay
    }

    fn search(&self, term: &str, minimum_duration: f64, aspect: VideoAspect) -> FootageResult<Vec<ClipCandidate>> {
        let (w, h) = aspect.resolution();
        Ok((0..self.per_term)
            .map(|i| {
                let duration = 6.0 + (i % 21) as f64;
                ClipCandidate::new(
                    ProviderKind::Pixabay,
                    format!("https://cdn.example/{}/{}.mp4?token=abc", term.replace(' ', "-"), i),
                    duration,
                )
                .with_resolution(w, h)
            })
            .filter(|c| c.duration >= minimum_duration)
            .collect())
    }

    fn download(&self, candidate: &ClipCandidate, dest_dir: &Path, cancel: &AtomicBool) -> FootageResult<PathBuf> {
        if cancel.load(Ordering::SeqCst) {
            return Err(FootageError::Cancelled);
        }
        fs::create_dir_all(dest_dir).map_err(|e| FootageError::io("creating clip dir", e))?;
        let path = dest_dir.join(cache_file_name(&candidate.source_url));
        fs::write(&path, b"clip").map_err(|e| FootageError::io("writing clip", e))?;
        self.downloads.lock().push(candidate.source_url.clone());
        Ok(path)
    }
}

pub struct CannedScript;

impl ScriptGenerator for CannedScript {
    fn generate_script(&self, _topic: &str, _language: &str) -> ScriptResult<String> {
        Ok(SCRIPT.to_string())
    }

    fn generate_terms(&self, _topic: &str, _script: &str, _count: usize) -> ScriptResult<Vec<String>> {
        Ok(vec!["coral reef".to_string(), "ocean waves".to_string()])
    }
}

/// Word boundary events, 1.2s per word.
pub struct WordNarrator;

impl NarrationSynthesizer for WordNarrator {
    fn synthesize(&self, request: &SynthesisRequest, audio_path: &Path) -> NarrationResult<Narration> {
        fs::write(audio_path, b"ID3").map_err(|_| NarrationError::MissingAudio(audio_path.to_path_buf()))?;
        Ok(Narration {
            audio_path: audio_path.to_path_buf(),
            events: word_events(&request.text, 1200.0),
        })
    }
}

pub struct TouchRenderer;

impl Renderer for TouchRenderer {
    fn combine(&self, request: &RenderRequest) -> RenderResult<PathBuf> {
        fs::write(&request.output_path, b"video").map_err(|e| RenderError::io("writing video", e))?;
        Ok(request.output_path.clone())
    }
}

/// One event per word; words after the first carry a leading space.
pub fn word_events(text: &str, ms_per_word: f64) -> Vec<SpeechEvent> {
    text.split_whitespace()
        .enumerate()
        .map(|(i, w)| {
            let t = if i == 0 { w.to_string() } else { format!(" {}", w) };
            SpeechEvent::new(t, i as f64 * ms_per_word, (i + 1) as f64 * ms_per_word)
        })
        .collect()
}

pub fn collaborators() -> Collaborators {
    Collaborators {
        script: Box::new(CannedScript),
        narrator: Box::new(WordNarrator),
        footage: Box::new(StockLibrary::new(30)),
        renderer: Box::new(TouchRenderer),
    }
}

pub fn settings(root: &Path) -> Settings {
    let mut settings = Settings::default();
    settings.paths.temp_root = root.join("temp").to_string_lossy().into_owned();
    settings.paths.output_folder = root.join("output").to_string_lossy().into_owned();
    settings.paths.logs_folder = root.join("logs").to_string_lossy().into_owned();
    settings.paths.material_directory = String::new();
    settings
}
