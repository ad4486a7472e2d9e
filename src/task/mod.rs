//! Task model
//!
//! Tasks, their fluent builder, and the registry they are collected in.

pub mod builder;
pub mod definition;
pub mod registry;

// Re-export main types
pub use builder::*;
pub use definition::*;
pub use registry::*;
