//! Domain entities and business rules

pub mod audio;
pub mod collaborators;
pub mod entities;
pub mod event;
pub mod geometry;
pub mod orchestrator;
pub mod registry;
pub mod settings;

#[cfg(test)]
mod testing;

// Re-export specific items to avoid ambiguous glob imports
pub use audio::adapter::{AudioAdapter, TestSoundResult, TestSoundSink, TestSoundState};
pub use audio::rotator::{PositionRotator, RotationPath, RotatorEvent};
pub use audio::{AudioDriver, BackendKind, DriverError, TestSoundError};
pub use collaborators::{GameData, SettingsUi, SettingsView, VoiceChat, PLUGIN_HELP_URL};
pub use entities::{Camera, User, UserId};
pub use event::Event;
pub use geometry::Vector3;
pub use orchestrator::Orchestrator;
pub use registry::{AdapterRegistry, BackendTable};
pub use settings::{MemorySettingsStore, RotateMode, Settings, SettingsError, SettingsStore};
