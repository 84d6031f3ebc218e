//! Whole jobs through the standard pipeline with in-process collaborators.

mod common;

use std::sync::Arc;

use parking_lot::Mutex;
use vidgen_core::models::{JobMetadata, JobSpec, ScriptSource};
use vidgen_core::orchestrator::{JobRunner, RunOptions, JOB_STATE_FILE};

#[test]
fn topic_to_published_video() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = common::settings(dir.path());
    settings.narration.max_attempts = 1;
    let runner = JobRunner::new(settings);

    let progress = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&progress);
    let out_dir = dir.path().join("published");
    let options = RunOptions::default()
        .with_output_dir(&out_dir)
        .with_progress_callback(Box::new(move |step, percent, _| {
            sink.lock().push((step.to_string(), percent));
        }));

    let outcome = runner.run_with(JobSpec::new("ocean conservation"), common::collaborators(), options);

    assert!(outcome.success, "{:?}", outcome.error);
    assert!(!outcome.captions_degraded);
    assert_eq!(
        outcome.steps_completed,
        vec!["Script", "Narration", "Captions", "Footage", "Render", "Publish"]
    );
    assert_eq!(outcome.videos, vec![out_dir.join("video-1.mp4")]);

    let meta: JobMetadata =
        serde_json::from_str(&std::fs::read_to_string(out_dir.join("script.json")).unwrap()).unwrap();
    assert_eq!(meta.script, common::SCRIPT);
    assert_eq!(meta.terms, vec!["coral reef", "ocean waves"]);
    assert_eq!(meta.caption_strategy.as_deref(), Some("sentence-aligned"));

    let srt = std::fs::read_to_string(out_dir.join("subtitle.srt")).unwrap();
    assert!(srt.contains("Reefs shelter a quarter of sea life."));

    let work_dir = dir.path().join("temp").join(&outcome.job_id);
    assert!(work_dir.join(JOB_STATE_FILE).is_file());

    let progress = progress.lock();
    assert_eq!(progress.first().map(|p| p.1), Some(0));
    assert_eq!(progress.last().map(|p| p.1), Some(100));
}

#[test]
fn disabled_captions_and_custom_script() {
    let dir = tempfile::tempdir().unwrap();
    let runner = JobRunner::new(common::settings(dir.path()));

    let mut spec = JobSpec::new("kelp forests");
    spec.script = ScriptSource::Provided("Kelp grows fast. It feeds many animals.".to_string());
    spec.captions_enabled = false;
    spec.video_count = 2;

    let out_dir = dir.path().join("published");
    let outcome = runner.run_with(spec, common::collaborators(), RunOptions::default().with_output_dir(&out_dir));

    assert!(outcome.success, "{:?}", outcome.error);
    assert_eq!(outcome.steps_skipped, vec!["Captions"]);
    assert_eq!(outcome.videos.len(), 2);
    assert!(!out_dir.join("subtitle.srt").exists());

    let meta: JobMetadata =
        serde_json::from_str(&std::fs::read_to_string(out_dir.join("script.json")).unwrap()).unwrap();
    assert!(meta.custom_script);
    assert!(meta.caption_strategy.is_none());
}

#[test]
fn consecutive_jobs_keep_their_own_files() {
    let dir = tempfile::tempdir().unwrap();
    let settings = common::settings(dir.path());
    let output_root = std::path::PathBuf::from(&settings.paths.output_folder);
    let runner = JobRunner::new(settings);

    let reef = runner.run_with(JobSpec::new("coral reefs"), common::collaborators(), RunOptions::default());
    let kelp = runner.run_with(JobSpec::new("kelp forests"), common::collaborators(), RunOptions::default());

    assert!(reef.success, "{:?}", reef.error);
    assert!(kelp.success, "{:?}", kelp.error);
    assert_ne!(reef.job_id, kelp.job_id);

    let reef_out = reef.output_dir.unwrap();
    let kelp_out = kelp.output_dir.unwrap();
    assert_ne!(reef_out, kelp_out);
    assert!(reef_out.starts_with(&output_root) && kelp_out.starts_with(&output_root));

    let topic_of = |out: &std::path::Path| {
        let meta: JobMetadata =
            serde_json::from_str(&std::fs::read_to_string(out.join("script.json")).unwrap()).unwrap();
        meta.topic
    };
    assert_eq!(topic_of(&reef_out), "coral reefs");
    assert_eq!(topic_of(&kelp_out), "kelp forests");
}
