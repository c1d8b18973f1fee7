//! cnc-motion-core
//!
//! A geometry-first G-code execution pipeline: modal interpretation, arc and
//! linear segmentation, a streaming lookahead controller with an explicit
//! state machine, and a pluggable motion executor.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod executor;
pub mod interpreter;
pub mod logging;
pub mod modal;
pub mod parser;
pub mod primitive;
pub mod streamer;

// Re-export commonly used types
pub use error::{Error, Result};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
