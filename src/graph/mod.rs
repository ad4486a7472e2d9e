//! Task graph
//!
//! Dependency resolution and the execution plans it produces.

pub mod plan;
pub mod resolver;

// Re-export main types
pub use plan::*;
pub use resolver::*;
