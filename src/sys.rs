//! Interfaces to the desktop shell that hosts the engine.

pub mod bridge;
pub mod host;
