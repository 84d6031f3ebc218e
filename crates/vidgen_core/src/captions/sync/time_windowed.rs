//! Time-windowed captions.
//!
//! Consecutive events are grouped until the group spans the configured line
//! duration, ignoring sentence boundaries. Used when sentence alignment
//! produces nothing.

use crate::captions::types::{CaptionCue, CaptionStrategyKind};
use crate::models::SpeechEvent;

use super::CaptionStrategy;

pub struct TimeWindowed {
    max_line_duration_ms: f64,
}

impl TimeWindowed {
    pub fn new(max_line_duration_ms: f64) -> Self {
        Self { max_line_duration_ms }
    }
}

impl Default for TimeWindowed {
    fn default() -> Self {
        Self::new(3000.0)
    }
}

impl CaptionStrategy for TimeWindowed {
    fn kind(&self) -> CaptionStrategyKind {
        CaptionStrategyKind::TimeWindowed
    }

    /// Cue text is the group's text trimmed, so whitespace at a group
    /// boundary separates two cues instead of belonging to either.
    fn align(&self, events: &[SpeechEvent], _script: &str) -> Vec<CaptionCue> {
        let mut cues = Vec::new();
        let mut text = String::new();
        let mut group_start: Option<f64> = None;

        for (i, event) in events.iter().enumerate() {
            let start = *group_start.get_or_insert(event.start_ms);
            text.push_str(&event.text);

            let is_last = i + 1 == events.len();
            if event.end_ms - start >= self.max_line_duration_ms || is_last {
                let line = text.trim();
                // Blank groups carry over into the next line
                if !line.is_empty() {
                    cues.push(CaptionCue::new(cues.len() + 1, start, event.end_ms, line));
                    text.clear();
                    group_start = None;
                }
            }
        }

        cues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_by_window() {
        let events: Vec<SpeechEvent> = (0..7)
            .map(|i| SpeechEvent::new(format!("w{}", i), i as f64 * 1000.0, i as f64 * 1000.0 + 900.0))
            .collect();

        let cues = TimeWindowed::default().align(&events, "");

        // w0..w2 reach 2900ms (<3000), w3 ends at 3900ms from 0
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].text, "w0w1w2w3");
        assert_eq!((cues[0].start_ms, cues[0].end_ms), (0.0, 3900.0));
        assert_eq!(cues[1].text, "w4w5w6");
        assert_eq!(cues[1].end_ms, 6900.0);
    }

    #[test]
    fn word_gap_at_window_boundary_separates_cues() {
        let events = vec![
            SpeechEvent::new("Hola", 0.0, 900.0),
            SpeechEvent::new(" a", 900.0, 1400.0),
            SpeechEvent::new(" todos", 1400.0, 3100.0),
            SpeechEvent::new(" los", 3100.0, 3500.0),
            SpeechEvent::new(" peces", 3500.0, 4200.0),
        ];

        let cues = TimeWindowed::default().align(&events, "");

        let texts: Vec<&str> = cues.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["Hola a todos", "los peces"]);
        let spoken: String = events.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts.join(" "), spoken);
    }

    #[test]
    fn single_event_gives_one_cue() {
        let cues = TimeWindowed::default().align(&[SpeechEvent::new("Hi", 0.0, 200.0)], "");
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "Hi");
    }

    #[test]
    fn blank_groups_carry_over() {
        let events = vec![
            SpeechEvent::new(" ", 0.0, 3500.0),
            SpeechEvent::new("word", 3500.0, 3700.0),
        ];
        let cues = TimeWindowed::default().align(&events, "");
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "word");
        assert_eq!(cues[0].start_ms, 0.0);
    }
}
