//! Caption synchronization strategies.
//!
//! Strategies implement the `CaptionStrategy` trait and are created via the
//! factory function. `Synchronizer` runs the primary strategy and falls back
//! when it produces nothing.
//!
//! # Available Strategies
//!
//! - **SentenceAligned**: cues follow script sentences (primary).
//! - **TimeWindowed**: cues follow a fixed time window (fallback).

mod sentence_aligned;
mod time_windowed;

pub use sentence_aligned::SentenceAligned;
pub use time_windowed::TimeWindowed;

use crate::captions::error::{CaptionError, CaptionResult};
use crate::captions::types::{CaptionCue, CaptionStrategyKind, SyncConfig, SyncOutcome};
use crate::models::SpeechEvent;

/// Turns speech events into caption cues.
pub trait CaptionStrategy: Send + Sync {
    fn kind(&self) -> CaptionStrategyKind;

    /// Produce cues in event order. An empty result means the strategy
    /// could not caption this narration.
    fn align(&self, events: &[SpeechEvent], script: &str) -> Vec<CaptionCue>;
}

/// Create a strategy from its kind.
pub fn create_strategy(kind: CaptionStrategyKind, config: &SyncConfig) -> Box<dyn CaptionStrategy> {
    match kind {
        CaptionStrategyKind::SentenceAligned => Box::new(SentenceAligned::with_threshold(config.fuzzy_threshold)),
        CaptionStrategyKind::TimeWindowed => Box::new(TimeWindowed::new(config.max_line_duration_ms)),
    }
}

/// Primary strategy plus fallback.
pub struct Synchronizer {
    primary: Box<dyn CaptionStrategy>,
    fallback: Box<dyn CaptionStrategy>,
}

impl Synchronizer {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            primary: create_strategy(CaptionStrategyKind::SentenceAligned, config),
            fallback: create_strategy(CaptionStrategyKind::TimeWindowed, config),
        }
    }

    /// Replace the primary strategy (builder pattern).
    pub fn with_primary(mut self, primary: Box<dyn CaptionStrategy>) -> Self {
        self.primary = primary;
        self
    }

    /// Caption a narration.
    ///
    /// The fallback only runs when the primary strategy produced no cues at
    /// all; a partial primary result is kept as is.
    pub fn run(&self, events: &[SpeechEvent], script: &str) -> CaptionResult<SyncOutcome> {
        if events.is_empty() {
            return Err(CaptionError::NoEvents);
        }

        let cues = self.primary.align(events, script);
        if !cues.is_empty() {
            tracing::info!("{} captions aligned by {}", cues.len(), self.primary.kind());
            return Ok(SyncOutcome {
                cues,
                strategy: self.primary.kind(),
            });
        }

        tracing::warn!(
            "{} produced no captions, falling back to {}",
            self.primary.kind(),
            self.fallback.kind()
        );
        let cues = self.fallback.align(events, script);
        if cues.is_empty() {
            return Err(CaptionError::NoText);
        }

        Ok(SyncOutcome {
            cues,
            strategy: self.fallback.kind(),
        })
    }
}

/// Caption a narration with the default strategies.
pub fn synchronize(events: &[SpeechEvent], script: &str, config: &SyncConfig) -> CaptionResult<SyncOutcome> {
    Synchronizer::new(config).run(events, script)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_success_is_not_degraded() {
        let events = vec![SpeechEvent::new("Hello.", 0.0, 500.0)];
        let outcome = synchronize(&events, "Hello.", &SyncConfig::default()).unwrap();
        assert_eq!(outcome.strategy, CaptionStrategyKind::SentenceAligned);
        assert!(!outcome.is_degraded());
    }

    #[test]
    fn falls_back_when_nothing_matches() {
        let events = vec![
            SpeechEvent::new("Bonjour", 0.0, 400.0),
            SpeechEvent::new("monde", 400.0, 900.0),
        ];
        let outcome = synchronize(&events, "Completely different words.", &SyncConfig::default()).unwrap();
        assert!(outcome.is_degraded());
        assert_eq!(outcome.cues.len(), 1);
        assert_eq!(outcome.cues[0].text, "Bonjourmonde");
    }

    #[test]
    fn no_events_is_an_error() {
        assert!(matches!(
            synchronize(&[], "Hello.", &SyncConfig::default()),
            Err(CaptionError::NoEvents)
        ));
    }

    #[test]
    fn blank_events_are_an_error() {
        let events = vec![SpeechEvent::new("  ", 0.0, 100.0)];
        assert!(matches!(
            synchronize(&events, "Hello.", &SyncConfig::default()),
            Err(CaptionError::NoText)
        ));
    }

    #[test]
    fn custom_primary() {
        struct Never;
        impl CaptionStrategy for Never {
            fn kind(&self) -> CaptionStrategyKind {
                CaptionStrategyKind::SentenceAligned
            }
            fn align(&self, _: &[SpeechEvent], _: &str) -> Vec<CaptionCue> {
                Vec::new()
            }
        }

        let events = vec![SpeechEvent::new("Hello.", 0.0, 500.0)];
        let outcome = Synchronizer::new(&SyncConfig::default())
            .with_primary(Box::new(Never))
            .run(&events, "Hello.")
            .unwrap();
        assert!(outcome.is_degraded());
    }
}
