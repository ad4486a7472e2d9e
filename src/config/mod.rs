//! Build file parsing and validation
//!
//! This module handles parsing of bake.yml build files, validation of their
//! structure, and registering their tasks with an engine.

pub mod build;
pub mod parse;
pub mod schema;
pub mod types;

// Re-export main types
pub use build::*;
pub use parse::*;
pub use schema::*;
pub use types::*;
