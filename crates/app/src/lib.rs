//! Earshot host: wires the orchestrator to its collaborators and drives it
//! from a single-threaded event loop

pub mod bootstrap;
pub mod runtime;
