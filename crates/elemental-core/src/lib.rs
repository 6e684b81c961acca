//! Elemental Core - Types, event names, and error handling

pub mod error;
pub mod event;
pub mod types;

pub use error::{Error, Result};
pub use event::*;
pub use types::*;
