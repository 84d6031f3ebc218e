//! vidgen core - backend logic for turning a topic into a narrated short video.
//!
//! The pipeline writes a script, narrates it, captions the narration,
//! curates stock footage to cover it and renders the result. Everything
//! here is UI-free and can be driven by the CLI or embedded elsewhere.

pub mod captions;
pub mod config;
pub mod footage;
pub mod jobs;
pub mod logging;
pub mod models;
pub mod narration;
pub mod orchestrator;
pub mod process;
pub mod render;
pub mod retry;
pub mod script;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}
