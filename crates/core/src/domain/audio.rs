//! Audio backend abstractions
//!
//! This module defines the driver interface every audio-rendering backend
//! implements, together with the closed set of backend kinds. Concrete
//! drivers live in the `infra` crate; the per-backend facade that turns
//! domain events into driver calls lives in [`adapter`].

pub mod adapter;
pub mod rotator;

use crate::domain::entities::UserId;
use crate::domain::geometry::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Failure reported by an audio driver (lost device, unsupported format,
/// resource exhaustion, ...)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Audio driver failure in {operation}: {reason}")]
pub struct DriverError {
    pub operation: String,
    pub reason: String,
}

impl DriverError {
    pub fn new(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DriverError>;

/// Outcome of a test-sound run that did not succeed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TestSoundError {
    /// A run is already active on the adapter; the active run is unaffected
    #[error("Test sound is already playing")]
    InProgress,

    /// The driver failed while starting, moving or stopping the test sound
    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// Underlying audio-rendering technology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Positioning provided by the voice-chat client itself
    BuiltIn,
    /// Positioning rendered through an OpenAL device with optional HRTF
    OpenAl,
}

impl BackendKind {
    /// Every kind, in broadcast order
    pub const ALL: [BackendKind; 2] = [BackendKind::BuiltIn, BackendKind::OpenAl];
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::BuiltIn => write!(f, "built_in"),
            BackendKind::OpenAl => write!(f, "open_al"),
        }
    }
}

/// Driver interface that every rendering backend implements.
///
/// Calls are synchronous and never re-entered; a driver may use threads
/// internally but must finish the call before returning.
pub trait AudioDriver {
    /// Place (or move) a user's voice at `position`
    fn position_user(&mut self, id: UserId, position: Vector3) -> Result<()>;

    /// Stop rendering a user's voice
    fn remove_user(&mut self, id: UserId) -> Result<()>;

    /// Move the listener
    fn position_camera(&mut self, position: Vector3, forward: Vector3, up: Vector3) -> Result<()>;

    /// Start looping the test-sound asset found at `asset`
    fn play_test_sound(&mut self, asset: &Path) -> Result<()>;

    /// Move the test sound relative to the listener
    fn position_test_sound(&mut self, position: Vector3) -> Result<()>;

    fn stop_test_sound(&mut self) -> Result<()>;

    fn set_playback_device_name(&mut self, name: &str) -> Result<()>;

    fn set_playback_volume(&mut self, volume: f32) -> Result<()>;

    fn set_enabled(&mut self, enabled: bool) -> Result<()>;

    fn is_enabled(&self) -> bool;

    fn set_hrtf_enabled(&mut self, enabled: bool) -> Result<()>;

    fn set_hrtf_data_set(&mut self, name: &str) -> Result<()>;

    /// Names of the HRTF data sets this backend can load
    fn hrtf_data_file_names(&self) -> Result<Vec<String>>;

    fn set_logging_level(&mut self, level: i32) -> Result<()>;
}
