//! User-facing settings and the port used to persist them

use crate::domain::audio::BackendKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised by a settings persistence backend
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    Parse(String),

    #[error("Failed to serialize settings: {0}")]
    Serialize(String),

    #[error("Invalid settings location: {0}")]
    Location(String),
}

pub type Result<T> = std::result::Result<T, SettingsError>;

/// Geometric path swept by the test sound around the listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotateMode {
    /// Jumps between the eight compass points, holding each for a second
    #[default]
    Stepped,
    /// Glides around the listener in small increments
    Smooth,
}

impl fmt::Display for RotateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotateMode::Stepped => write!(f, "stepped"),
            RotateMode::Smooth => write!(f, "smooth"),
        }
    }
}

/// Complete settings record, always replaced as a whole
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub positioning_enabled: bool,
    pub audio_backend: BackendKind,
    pub hrtf_enabled: bool,
    pub hrtf_data_set: String,
    pub audio_logging_level: i32,
    pub test_rotate_mode: RotateMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            positioning_enabled: true,
            audio_backend: BackendKind::OpenAl,
            hrtf_enabled: false,
            hrtf_data_set: String::new(),
            audio_logging_level: 0,
            test_rotate_mode: RotateMode::Stepped,
        }
    }
}

/// Persistence collaborator for [`Settings`]
pub trait SettingsStore {
    /// Read the persisted settings; implementations fall back to defaults
    fn load(&self) -> Settings;

    /// Persist the settings, replacing whatever was stored
    fn save(&mut self, settings: &Settings) -> Result<()>;
}

/// Non-persistent store, used when no settings file is wanted
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    settings: Settings,
}

impl MemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Settings {
        self.settings.clone()
    }

    fn save(&mut self, settings: &Settings) -> Result<()> {
        self.settings = settings.clone();
        Ok(())
    }
}
