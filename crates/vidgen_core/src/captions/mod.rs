//! Caption synchronization.
//!
//! Turns narration timing events and the narration script into caption
//! cues. The primary strategy aligns cues to script sentences; when it
//! yields nothing the events are grouped into fixed-length time windows.

mod error;
mod matcher;
mod split;
pub mod srt;
pub mod sync;
mod types;

pub use error::{CaptionError, CaptionResult};
pub use matcher::{char_set_similarity, MatchTier, TextMatcher, TieredMatcher};
pub use split::split_sentences;
pub use srt::{parse_srt, read_srt_file, write_srt, write_srt_file};
pub use sync::{create_strategy, synchronize, CaptionStrategy, Synchronizer};
pub use types::{CaptionCue, CaptionStrategyKind, SyncConfig, SyncOutcome};
