//! Task execution engine
//!
//! This module handles running a resolved plan: the run context, execution
//! strategies, the engine itself, and the shell commands and conditions that
//! build files use as actions and criteria.

pub mod command;
pub mod context;
pub mod engine;
pub mod interpolate;
pub mod strategy;
pub mod when;

// Re-export main types
pub use command::*;
pub use context::*;
pub use engine::*;
pub use interpolate::*;
pub use strategy::*;
pub use when::*;
