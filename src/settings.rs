//! Fishing settings and config file loading

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::FisherError;
use crate::utils::path::get_data_dir;

/// How small a downward lure movement counts as a bite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Sensitivity {
    High,
    #[default]
    Medium,
    Low,
}

impl Sensitivity {
    /// Normalised vertical velocity the lure must reach (or go below) for a bite.
    pub fn motion_threshold(&self) -> f64 {
        match self {
            Sensitivity::High => -0.02,
            Sensitivity::Medium => -0.035,
            Sensitivity::Low => -0.05,
        }
    }
}

/// How long to wait before acting again after a reel or recast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReactionSpeed {
    Fast,
    #[default]
    Medium,
    Slow,
}

impl ReactionSpeed {
    /// Ticks to skip before the next decision
    pub fn cooldown_ticks(&self) -> u32 {
        match self {
            ReactionSpeed::Fast => 0,
            ReactionSpeed::Medium => 5,
            ReactionSpeed::Slow => 10,
        }
    }
}

/// Settings snapshot taken when the fisher starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Turn the head toward nearby water once before the first cast
    pub keep_rotation: bool,
    pub sensitivity: Sensitivity,
    pub reaction_speed: ReactionSpeed,
}

/// Get settings file path
pub fn get_settings_path() -> PathBuf {
    get_data_dir().join("config").join("settings.json")
}

/// Load settings from a specific file
pub fn load_settings_from(path: &Path) -> Result<Settings, FisherError> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| FisherError::Config {
        path: path.to_path_buf(),
        source,
    })
}

/// Get current settings, falling back to defaults when the file is missing or broken
pub fn get_settings() -> Settings {
    let settings_file = get_settings_path();

    if !settings_file.exists() {
        tracing::debug!("No settings file at {:?}, using defaults", settings_file);
        return Settings::default();
    }

    match load_settings_from(&settings_file) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("[INIT] {}; using default settings", e);
            Settings::default()
        }
    }
}
