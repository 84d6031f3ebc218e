//! vidgen - generate short narrated videos from a topic.
//!
//! Usage:
//!   vidgen --topic "ocean conservation"
//!   vidgen --topic "robots" --source local --materials "clips/*.mp4" --count 2

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;

use vidgen_core::config::ConfigManager;
use vidgen_core::footage::expand_material_patterns;
use vidgen_core::jobs::cleanup_old_outputs;
use vidgen_core::logging::{init_tracing_with_file, LogLevel};
use vidgen_core::models::{JobSpec, ProviderKind, ScriptSource, TermsSource, VideoAspect};
use vidgen_core::orchestrator::{JobRunner, RunOptions};

const DEFAULT_CONFIG: &str = ".config/vidgen.toml";

/// Generate a narrated short video about a topic
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Video topic (also the fallback footage search)
    #[arg(long)]
    topic: String,

    /// Narration language code, e.g. en-US or zh-CN
    #[arg(long)]
    language: Option<String>,

    /// Voice name for synthesis, e.g. en-US-JennyNeural
    #[arg(long)]
    voice: Option<String>,

    /// portrait, landscape or square
    #[arg(long)]
    aspect: Option<VideoAspect>,

    /// Publish here instead of a timestamped folder under the output folder
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Number of video variants to render
    #[arg(long)]
    count: Option<u32>,

    /// Narration script (skips generation)
    #[arg(long, conflicts_with = "script_file")]
    script: Option<String>,

    /// File containing the narration script
    #[arg(long)]
    script_file: Option<PathBuf>,

    /// Comma-separated footage search terms (skips generation)
    #[arg(long, value_delimiter = ',')]
    terms: Vec<String>,

    /// Footage source: pexels, pixabay or local
    #[arg(long)]
    source: Option<ProviderKind>,

    /// Comma-separated local material paths or glob patterns
    #[arg(long, value_delimiter = ',')]
    materials: Vec<String>,

    /// Do not produce captions
    #[arg(long)]
    no_subtitle: bool,

    /// Prune expired output folders next to --out-dir as well
    #[arg(long)]
    cleanup: bool,

    /// Settings file
    #[arg(long, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigManager::new(&cli.config);
    config
        .load_or_create()
        .with_context(|| format!("loading settings from {}", cli.config.display()))?;
    config.ensure_dirs_exist().context("creating configured folders")?;

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        config.settings().logging.level.parse().unwrap_or_default()
    };
    let _guard = init_tracing_with_file(level, config.logs_folder());

    let mut settings = config.into_settings();
    if cli.verbose {
        settings.logging.compact = false;
    }

    let spec = build_spec(&cli, &settings)?;

    if cli.cleanup {
        if let Some(base) = cli.out_dir.as_deref().and_then(Path::parent) {
            let removed = cleanup_old_outputs(
                base,
                settings.retention.retention_days,
                chrono::Local::now().naive_local(),
            )?;
            tracing::info!("Removed {} expired output folder(s) from {}", removed.len(), base.display());
        }
    }

    print_summary(&spec, cli.out_dir.as_deref());

    let mut options = RunOptions::default().with_log_callback(Box::new(|line| println!("{}", line)));
    if let Some(dir) = &cli.out_dir {
        options = options.with_output_dir(dir);
    }

    let outcome = JobRunner::new(settings).run(spec, options);
    if !outcome.success {
        bail!(
            "video generation failed: {}",
            outcome.error.unwrap_or_else(|| "unknown error".to_string())
        );
    }

    println!();
    println!("Video generation complete");
    for video in &outcome.videos {
        println!("  {}", video.display());
    }
    if outcome.captions_degraded {
        println!("  (captions were timed by the fallback strategy)");
    }
    if let Some(dir) = &outcome.output_dir {
        println!("All files saved to: {}", dir.display());
    }
    Ok(())
}

fn build_spec(cli: &Cli, settings: &vidgen_core::config::Settings) -> Result<JobSpec> {
    if cli.topic.trim().is_empty() {
        bail!("--topic must not be empty");
    }

    let mut spec = JobSpec::new(cli.topic.trim());
    spec.language = cli.language.clone().unwrap_or_else(|| settings.script.language.clone());
    spec.voice = cli.voice.clone().unwrap_or_else(|| settings.narration.voice.clone());
    spec.aspect = cli.aspect.unwrap_or(settings.render.aspect);
    spec.source = cli.source.unwrap_or(settings.footage.source);
    spec.video_count = cli.count.unwrap_or(settings.render.video_count).max(1);
    spec.captions_enabled = !cli.no_subtitle && settings.captions.enabled;

    let script = match (&cli.script, &cli.script_file) {
        (Some(text), _) => Some(text.clone()),
        (None, Some(path)) => Some(
            fs::read_to_string(path).with_context(|| format!("reading script file {}", path.display()))?,
        ),
        (None, None) => None,
    };
    if let Some(text) = script.filter(|t| !t.trim().is_empty()) {
        spec.script = ScriptSource::Provided(text);
    }

    let terms: Vec<String> = cli
        .terms
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    if !terms.is_empty() {
        spec.terms = TermsSource::Provided(terms);
    }

    if spec.source == ProviderKind::Local {
        if cli.materials.is_empty() {
            bail!("--materials is required when --source=local");
        }
        spec.materials = expand_material_patterns(&cli.materials);
        if spec.materials.is_empty() {
            bail!("no local materials found matching: {}", cli.materials.join(","));
        }
        tracing::info!("Found {} local materials", spec.materials.len());
    }

    Ok(spec)
}

fn print_summary(spec: &JobSpec, out_dir: Option<&Path>) {
    println!("Video generation");
    println!("  Topic:    {}", spec.topic);
    println!("  Language: {}", spec.language);
    println!("  Voice:    {}", spec.voice);
    println!("  Aspect:   {}", spec.aspect);
    println!("  Source:   {}", spec.source);
    if let ScriptSource::Provided(text) = &spec.script {
        let preview: String = text.chars().take(80).collect();
        let ellipsis = if text.chars().count() > 80 { "..." } else { "" };
        println!("  Script:   {}{}", preview, ellipsis);
    }
    if let TermsSource::Provided(terms) = &spec.terms {
        println!("  Terms:    {}", terms.join(", "));
    }
    if let Some(dir) = out_dir {
        println!("  Output:   {}", dir.display());
    }
    println!();
}
