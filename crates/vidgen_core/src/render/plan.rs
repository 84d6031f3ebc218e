//! Segment planning: which clip plays for how long.

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::models::{ConcatMode, DownloadedClip};

use super::error::{RenderError, RenderResult};

/// One cut of one clip, taken from the clip's start.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub path: PathBuf,
    /// Seconds to take from the clip.
    pub duration: f64,
}

/// Total planned seconds.
pub fn planned_duration(segments: &[Segment]) -> f64 {
    segments.iter().map(|s| s.duration).sum()
}

/// Cycle through `clips` in order, cutting each to at most `max_clip`
/// seconds, until `audio_secs` is covered.
///
/// The last segment is shortened so the plan ends with the narration.
pub fn plan_segments(clips: &[DownloadedClip], audio_secs: f64, max_clip: f64) -> RenderResult<Vec<Segment>> {
    if audio_secs.is_nan() || audio_secs <= 0.0 {
        return Err(RenderError::InvalidDuration(audio_secs));
    }

    let usable: Vec<(&DownloadedClip, f64)> = clips
        .iter()
        .map(|c| {
            let cap = if max_clip > 0.0 { max_clip } else { c.usable_duration };
            (c, c.usable_duration.min(cap))
        })
        .filter(|(_, d)| *d > 0.0)
        .collect();
    if usable.is_empty() {
        return Err(RenderError::NoClips);
    }

    let mut segments = Vec::new();
    let mut covered = 0.0;

    for (clip, duration) in usable.iter().cycle() {
        let remaining = audio_secs - covered;
        if remaining <= 1e-6 {
            break;
        }
        let take = duration.min(remaining);
        segments.push(Segment {
            path: clip.path.clone(),
            duration: take,
        });
        covered += take;
    }

    Ok(segments)
}

/// Clip order for one rendered variant.
///
/// Random mode reshuffles per variant; a seed makes the order reproducible.
pub fn order_for_variant(
    clips: &[DownloadedClip],
    mode: ConcatMode,
    variant: u32,
    seed: Option<u64>,
) -> Vec<DownloadedClip> {
    let mut ordered = clips.to_vec();
    if mode == ConcatMode::Random {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(u64::from(variant))),
            None => StdRng::from_entropy(),
        };
        ordered.shuffle(&mut rng);
    }
    ordered
}
