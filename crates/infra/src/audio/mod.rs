//! Audio driver implementations
//!
//! Only a headless driver ships today. It keeps the state a rendering backend
//! would hold and journals every call, so the same orchestrator wiring can be
//! exercised without an output device.

pub mod headless;

pub use headless::*;
