//! elemental: component lifecycle runtime with clone detection
//!
//! The binary wires config and logging around the in-memory host and runs
//! the demo scenarios.

pub mod config;
pub mod demo;
pub mod logging;

pub use elemental_component as component;
pub use elemental_core as core;
