//! Concrete collaborators for the earshot core
//!
//! Nothing in here renders audio: the [`audio::HeadlessDriver`] only tracks
//! what a real backend would have been told, which is enough to host the
//! orchestrator from the command line and to test it end to end.

pub mod audio;
pub mod scenario;
pub mod settings;
pub mod ui;
pub mod voice;
