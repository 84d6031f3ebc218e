//! Budgeted fetching against a stock library.

mod common;

use std::sync::atomic::AtomicBool;

use common::StockLibrary;
use vidgen_core::footage::{BudgetedFetcher, FetchConfig, FetchRequest, FetchState, FootageError};

fn request(audio: f64, terms: &[&str]) -> FetchRequest {
    FetchRequest {
        audio_duration: audio,
        terms: terms.iter().map(|t| t.to_string()).collect(),
        fallback_subject: Some("ocean conservation".to_string()),
    }
}

#[test]
fn thirty_second_narration_gets_sixty_seconds_from_ten_sources() {
    let dir = tempfile::tempdir().unwrap();
    let library = StockLibrary::new(40);
    let config = FetchConfig::default().with_seed(42);
    assert_eq!(config.minimum_duration, 5.0);
    assert_eq!(config.redundancy_multiplier, 2.0);

    let report = BudgetedFetcher::new(&library, config, dir.path())
        .fetch(&request(30.0, &["ocean conservation"]), &AtomicBool::new(false))
        .unwrap();

    assert_eq!(report.state, FetchState::Sufficient);
    assert!(report.downloaded_duration >= 60.0);
    assert!(report.unique_sources() >= 10);
    assert_eq!(report.required_duration, 60.0);

    // Stops once the budget is met instead of draining the pool
    assert!(report.downloaded.len() < report.selected.len());
    assert_eq!(library.downloads.lock().len(), report.downloaded.len());
    for clip in &report.downloaded {
        assert!(clip.path.is_file());
        assert!(clip.usable_duration <= 5.0);
    }
}

#[test]
fn thin_terms_widen_to_the_topic() {
    let dir = tempfile::tempdir().unwrap();
    let library = StockLibrary::new(2);

    let report = BudgetedFetcher::new(&library, FetchConfig::default(), dir.path())
        .fetch(&request(30.0, &["kelp"]), &AtomicBool::new(false))
        .unwrap();

    assert!(report.fallback_used);
    // Two clips per search: the pool runs dry before the budget
    assert_eq!(report.state, FetchState::Exhausted);
    assert_eq!(report.downloaded.len(), 4);
}

#[test]
fn cancellation_stops_before_downloading() {
    let dir = tempfile::tempdir().unwrap();
    let library = StockLibrary::new(40);

    let err = BudgetedFetcher::new(&library, FetchConfig::default(), dir.path())
        .fetch(&request(30.0, &["ocean"]), &AtomicBool::new(true))
        .unwrap_err();

    assert!(matches!(err, FootageError::Cancelled));
    assert!(library.downloads.lock().is_empty());
}
