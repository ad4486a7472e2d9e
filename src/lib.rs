//! Bake - a build automation engine
//!
//! Tasks are registered by name with actions, criteria and ordering
//! relationships. A run resolves the target's dependency closure into a
//! deterministic plan, executes it with setup, teardown and error-handling
//! hooks, and returns a report of what ran, what was skipped and what failed.
//!
//! Tasks can be registered in code through [`Engine::register_task`] or
//! loaded from a `bake.yml` build file with [`config::build_engine`].

// Public modules
pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod logging;
pub mod report;
pub mod runner;
pub mod task;
pub mod ui;

// Re-export commonly used types
pub use error::{BakeError, Result};
pub use graph::{resolve, ExecutionPlan};
pub use report::{Report, ReportEntry, TaskStatus};
pub use runner::{Context, Engine, EngineSettings};
pub use task::{Registry, Task, TaskBuilder};

/// Current version of Bake
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
