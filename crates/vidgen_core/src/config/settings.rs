//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.
//! Loaded settings are read-only for the lifetime of a job.

use serde::{Deserialize, Serialize};

use crate::models::{ConcatMode, ProviderKind, TransitionMode, VideoAspect};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Script and search term generation.
    #[serde(default)]
    pub script: ScriptSettings,

    /// Narration synthesis.
    #[serde(default)]
    pub narration: NarrationSettings,

    /// Footage search, selection and download.
    #[serde(default)]
    pub footage: FootageSettings,

    /// Caption synchronization.
    #[serde(default)]
    pub captions: CaptionSettings,

    /// Final render.
    #[serde(default)]
    pub render: RenderSettings,

    /// Output retention.
    #[serde(default)]
    pub retention: RetentionSettings,
}

/// Path configuration for output, temp, and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Output folder for published videos.
    #[serde(default = "default_output_folder")]
    pub output_folder: String,

    /// Root folder for per-job working directories.
    #[serde(default = "default_temp_root")]
    pub temp_root: String,

    /// Folder for log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,

    /// Where downloaded clips are cached.
    ///
    /// Empty: `clips/` inside the job directory. `"task"`: the job directory
    /// itself. Anything else: a shared cache directory reused across jobs.
    #[serde(default)]
    pub material_directory: String,
}

fn default_output_folder() -> String {
    "output".to_string()
}

fn default_temp_root() -> String {
    ".temp".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            output_folder: default_output_folder(),
            temp_root: default_temp_root(),
            logs_folder: default_logs_folder(),
            material_directory: String::new(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Use compact log format.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of tool output lines kept for error reports.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Progress update step percentage.
    #[serde(default = "default_progress_step")]
    pub progress_step: u32,

    /// Default tracing level when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

fn default_progress_step() -> u32 {
    20
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            compact: true,
            error_tail: default_error_tail(),
            progress_step: default_progress_step(),
            level: default_level(),
        }
    }
}

/// Script generation through an external agent command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptSettings {
    /// Program to run.
    #[serde(default = "default_agent_program")]
    pub agent_program: String,

    /// Arguments; `{prompt}` is replaced by the prompt text.
    #[serde(default = "default_agent_args")]
    pub agent_args: Vec<String>,

    /// Timeout for script generation in seconds.
    #[serde(default = "default_script_timeout")]
    pub timeout_secs: u64,

    /// Timeout for term generation in seconds.
    #[serde(default = "default_terms_timeout")]
    pub terms_timeout_secs: u64,

    /// Paragraphs requested from the agent.
    #[serde(default = "default_paragraph_number")]
    pub paragraph_number: u32,

    /// Search terms requested.
    #[serde(default = "default_terms_count")]
    pub terms_count: usize,

    /// Default narration language.
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_agent_program() -> String {
    "pnpm".to_string()
}

fn default_agent_args() -> Vec<String> {
    ["verso", "agent", "-m", "{prompt}", "--local", "--json"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_script_timeout() -> u64 {
    120
}

fn default_terms_timeout() -> u64 {
    60
}

fn default_paragraph_number() -> u32 {
    1
}

fn default_terms_count() -> usize {
    5
}

fn default_language() -> String {
    "en-US".to_string()
}

impl Default for ScriptSettings {
    fn default() -> Self {
        Self {
            agent_program: default_agent_program(),
            agent_args: default_agent_args(),
            timeout_secs: default_script_timeout(),
            terms_timeout_secs: default_terms_timeout(),
            paragraph_number: default_paragraph_number(),
            terms_count: default_terms_count(),
            language: default_language(),
        }
    }
}

/// Narration synthesis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrationSettings {
    /// Synthesis program.
    #[serde(default = "default_tts_program")]
    pub program: String,

    /// Default voice.
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Speaking rate multiplier (1.0 = normal).
    #[serde(default = "default_rate")]
    pub rate: f64,

    /// Attempts before giving up on empty timing output.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Timeout per attempt in seconds.
    #[serde(default = "default_tts_timeout")]
    pub timeout_secs: u64,

    /// Audio file extension.
    #[serde(default = "default_audio_extension")]
    pub audio_extension: String,
}

fn default_tts_program() -> String {
    "edge-tts".to_string()
}

fn default_voice() -> String {
    "en-US-JennyNeural".to_string()
}

fn default_rate() -> f64 {
    1.0
}

fn default_max_attempts() -> u32 {
    3
}

fn default_tts_timeout() -> u64 {
    300
}

fn default_audio_extension() -> String {
    "mp3".to_string()
}

impl Default for NarrationSettings {
    fn default() -> Self {
        Self {
            program: default_tts_program(),
            voice: default_voice(),
            rate: default_rate(),
            max_attempts: default_max_attempts(),
            timeout_secs: default_tts_timeout(),
            audio_extension: default_audio_extension(),
        }
    }
}

/// Footage search, selection and download settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FootageSettings {
    /// Default footage source.
    #[serde(default)]
    pub source: ProviderKind,

    /// Pexels API keys, rotated per request. Falls back to `PEXELS_API_KEY`.
    #[serde(default)]
    pub pexels_api_keys: Vec<String>,

    /// Pixabay API keys, rotated per request. Falls back to `PIXABAY_API_KEY`.
    #[serde(default)]
    pub pixabay_api_keys: Vec<String>,

    /// Minimum clip length in seconds.
    #[serde(default = "default_minimum_duration")]
    pub minimum_duration: f64,

    /// Seconds of each clip used in the render (0 = whole clip).
    #[serde(default = "default_max_clip_duration")]
    pub max_clip_duration: f64,

    /// Download budget as a multiple of narration duration.
    #[serde(default = "default_redundancy_multiplier")]
    pub redundancy_multiplier: f64,

    /// Minimum downloaded clips before stopping.
    #[serde(default = "default_min_unique_sources")]
    pub min_unique_sources: usize,

    /// Fallback search runs below `narration * exploration_multiplier`.
    #[serde(default = "default_exploration_multiplier")]
    pub exploration_multiplier: f64,

    /// Fallback merge stops at `narration * exploration * fallback_stop`.
    #[serde(default = "default_fallback_stop_multiplier")]
    pub fallback_stop_multiplier: f64,

    /// Minimum average diversity to accept a clip (0 disables).
    #[serde(default = "default_diversity_threshold")]
    pub diversity_threshold: f64,

    /// Keep only the top-scoring share of each search result.
    #[serde(default = "default_true")]
    pub quality_filter: bool,

    /// Results requested per search.
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Concurrent downloads.
    #[serde(default = "default_download_workers")]
    pub download_workers: usize,

    #[serde(default = "default_search_timeout")]
    pub search_timeout_secs: u64,

    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,
}

fn default_minimum_duration() -> f64 {
    5.0
}

fn default_max_clip_duration() -> f64 {
    5.0
}

fn default_redundancy_multiplier() -> f64 {
    2.0
}

fn default_min_unique_sources() -> usize {
    10
}

fn default_exploration_multiplier() -> f64 {
    3.0
}

fn default_fallback_stop_multiplier() -> f64 {
    2.0
}

fn default_diversity_threshold() -> f64 {
    0.3
}

fn default_per_page() -> u32 {
    50
}

fn default_download_workers() -> usize {
    4
}

fn default_search_timeout() -> u64 {
    60
}

fn default_download_timeout() -> u64 {
    240
}

impl Default for FootageSettings {
    fn default() -> Self {
        Self {
            source: ProviderKind::default(),
            pexels_api_keys: Vec::new(),
            pixabay_api_keys: Vec::new(),
            minimum_duration: default_minimum_duration(),
            max_clip_duration: default_max_clip_duration(),
            redundancy_multiplier: default_redundancy_multiplier(),
            min_unique_sources: default_min_unique_sources(),
            exploration_multiplier: default_exploration_multiplier(),
            fallback_stop_multiplier: default_fallback_stop_multiplier(),
            diversity_threshold: default_diversity_threshold(),
            quality_filter: true,
            per_page: default_per_page(),
            download_workers: default_download_workers(),
            search_timeout_secs: default_search_timeout(),
            download_timeout_secs: default_download_timeout(),
        }
    }
}

/// Caption synchronization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionSettings {
    /// Produce a caption file.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Line length in seconds for time-windowed captions.
    #[serde(default = "default_max_line_duration")]
    pub max_line_duration: f64,

    /// Character-set similarity needed for a fuzzy sentence match.
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,
}

fn default_max_line_duration() -> f64 {
    3.0
}

fn default_fuzzy_threshold() -> f64 {
    0.8
}

impl Default for CaptionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_line_duration: default_max_line_duration(),
            fuzzy_threshold: default_fuzzy_threshold(),
        }
    }
}

/// Render settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    #[serde(default = "default_ffmpeg")]
    pub program: String,

    #[serde(default = "default_ffprobe")]
    pub probe_program: String,

    #[serde(default)]
    pub aspect: VideoAspect,

    #[serde(default)]
    pub concat_mode: ConcatMode,

    #[serde(default)]
    pub transition: TransitionMode,

    #[serde(default = "default_fps")]
    pub fps: u32,

    /// Variants rendered per job.
    #[serde(default = "default_video_count")]
    pub video_count: u32,

    /// Timeout per render in seconds.
    #[serde(default = "default_render_timeout")]
    pub timeout_secs: u64,

    /// Burn captions into the picture.
    #[serde(default = "default_true")]
    pub burn_captions: bool,
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe() -> String {
    "ffprobe".to_string()
}

fn default_fps() -> u32 {
    30
}

fn default_video_count() -> u32 {
    1
}

fn default_render_timeout() -> u64 {
    1800
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            program: default_ffmpeg(),
            probe_program: default_ffprobe(),
            aspect: VideoAspect::default(),
            concat_mode: ConcatMode::default(),
            transition: TransitionMode::default(),
            fps: default_fps(),
            video_count: default_video_count(),
            timeout_secs: default_render_timeout(),
            burn_captions: true,
        }
    }
}

/// Output retention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionSettings {
    /// Delete output directories older than this many days (0 = keep all).
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

fn default_retention_days() -> u32 {
    7
}

impl Default for RetentionSettings {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
        }
    }
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Paths,
    Logging,
    Script,
    Narration,
    Footage,
    Captions,
    Render,
    Retention,
}

impl ConfigSection {
    /// All sections in file order.
    pub const ALL: [ConfigSection; 8] = [
        ConfigSection::Paths,
        ConfigSection::Logging,
        ConfigSection::Script,
        ConfigSection::Narration,
        ConfigSection::Footage,
        ConfigSection::Captions,
        ConfigSection::Render,
        ConfigSection::Retention,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Logging => "logging",
            ConfigSection::Script => "script",
            ConfigSection::Narration => "narration",
            ConfigSection::Footage => "footage",
            ConfigSection::Captions => "captions",
            ConfigSection::Render => "render",
            ConfigSection::Retention => "retention",
        }
    }

    /// Comment written above the section.
    pub fn description(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "Output and working directories",
            ConfigSection::Logging => "Logging configuration",
            ConfigSection::Script => "Script and search term generation",
            ConfigSection::Narration => "Narration synthesis",
            ConfigSection::Footage => "Footage search, selection and download",
            ConfigSection::Captions => "Caption synchronization",
            ConfigSection::Render => "Final render",
            ConfigSection::Retention => "Output retention",
        }
    }
}
