//! Configuration management for vidgen.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//! - Validation on load with automatic defaults
//!
//! # Example
//!
//! ```no_run
//! use vidgen_core::config::{ConfigManager, ConfigSection};
//!
//! // Create manager and load (or create default) config
//! let mut config = ConfigManager::new(".config/vidgen.toml");
//! config.load_or_create().unwrap();
//!
//! println!("Output folder: {}", config.settings().paths.output_folder);
//!
//! // Modify a setting and save just that section atomically
//! config.settings_mut().footage.download_workers = 8;
//! config.update_section(ConfigSection::Footage).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    CaptionSettings, ConfigSection, FootageSettings, LoggingSettings, NarrationSettings,
    PathSettings, RenderSettings, RetentionSettings, ScriptSettings, Settings,
};
