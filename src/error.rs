//! Error types for Bake

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Bake operations
pub type Result<T> = std::result::Result<T, BakeError>;

/// Main error type for Bake
#[derive(Error, Debug)]
pub enum BakeError {
    /// Build file errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Task registration errors
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Plan resolution errors
    #[error("Resolve error: {0}")]
    Resolve(#[from] ResolveError),

    /// Task execution errors
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// Shell command errors
    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Build file parsing and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find build file (searched: {0})")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Task '{task}' has an invalid condition: {reason}")]
    InvalidCondition { task: String, reason: String },

    #[error("Failed to include file '{path}': {error}")]
    IncludeFile { path: PathBuf, error: String },

    #[error("Failed to load environment file '{path}': {error}")]
    EnvFile { path: PathBuf, error: String },
}

/// Errors raised while populating a registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Another task with the name '{0}' has already been added")]
    DuplicateTask(String),

    #[error("Task name cannot be empty")]
    EmptyName,
}

/// Which edge of the graph referenced a missing task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Dependency,
    Dependee,
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceKind::Dependency => write!(f, "dependent on"),
            ReferenceKind::Dependee => write!(f, "a dependee of"),
        }
    }
}

/// Errors raised while turning a target into an execution plan
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("The target '{0}' was not found")]
    TargetNotFound(String),

    #[error("Task '{task}' is {kind} task '{dependency}' which does not exist")]
    DependencyNotFound {
        task: String,
        dependency: String,
        kind: ReferenceKind,
    },

    #[error("Cyclic dependency detected: {}", path.join(" -> "))]
    CyclicDependency { path: Vec<String> },
}

/// Errors raised while a plan is being executed
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// A task's action, criteria, hook or error handler failed
    #[error("Task '{task}' failed: {source:#}")]
    Task {
        task: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Setup failed: {source:#}")]
    Setup {
        #[source]
        source: anyhow::Error,
    },

    #[error("Teardown failed: {source:#}")]
    Teardown {
        #[source]
        source: anyhow::Error,
    },
}

impl ExecutionError {
    /// Name of the failing task, if the failure belongs to one
    pub fn task_name(&self) -> Option<&str> {
        match self {
            ExecutionError::Task { task, .. } => Some(task),
            _ => None,
        }
    }
}

/// Shell command errors
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Command failed with exit code {0:?}")]
    Failed(Option<i32>),

    #[error("Failed to spawn '{program}': {error}")]
    Spawn { program: String, error: io::Error },

    #[error("No interpreter configured")]
    NoInterpreter,

    #[error("Interpolation error: {0}")]
    Interpolation(#[from] InterpolationError),
}

/// Variable interpolation errors
#[derive(Error, Debug)]
pub enum InterpolationError {
    #[error("Recursive interpolation detected")]
    RecursiveInterpolation,
}

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for resolution
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;

/// Specialized result type for command operations
pub type CommandResult<T> = std::result::Result<T, CommandError>;

/// Specialized result type for interpolation operations
pub type InterpolationResult<T> = std::result::Result<T, InterpolationError>;
