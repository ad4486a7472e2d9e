//! Terminal output
//!
//! Renders reports and task listings. Nothing here influences execution.

pub mod report;

pub use report::*;
