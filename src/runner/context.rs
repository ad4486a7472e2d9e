//! Execution context for a run
//!
//! The context is the live state that criteria, actions and hooks observe.
//! It is owned by the caller and mutated only by the single execution thread.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

/// Run context shared by every task in a run
#[derive(Debug)]
pub struct Context {
    /// Current working directory
    pub working_dir: PathBuf,

    /// Build file path
    pub config_path: Option<PathBuf>,

    /// Arguments supplied by the caller (e.g. `--arg configuration=Release`)
    pub arguments: HashMap<String, String>,

    /// Variables set by earlier tasks in the same run
    pub vars: HashMap<String, String>,

    /// Interpreter used for shell commands (e.g., ["bash", "-c"])
    pub interpreter: Vec<String>,

    /// Task currently being executed
    pub current_task: Option<String>,

    /// Verbosity level
    pub verbosity: Verbosity,
}

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent = 0,
    Quiet = 1,
    Normal = 2,
    Verbose = 3,
}

impl Context {
    /// Create a new context with default settings
    pub fn new() -> Self {
        Context {
            working_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_path: None,
            arguments: HashMap::new(),
            vars: HashMap::new(),
            interpreter: vec!["sh".to_string(), "-c".to_string()],
            current_task: None,
            verbosity: Verbosity::Normal,
        }
    }

    /// Create a context with a specific working directory
    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = dir;
        self
    }

    /// Set the build file path
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    /// Set caller arguments
    pub fn with_arguments(mut self, arguments: HashMap<String, String>) -> Self {
        self.arguments = arguments;
        self
    }

    /// Set variables
    pub fn with_vars(mut self, vars: HashMap<String, String>) -> Self {
        self.vars = vars;
        self
    }

    /// Set the interpreter
    pub fn with_interpreter(mut self, interpreter: Vec<String>) -> Self {
        self.interpreter = interpreter;
        self
    }

    /// Set verbosity level
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Get a caller argument
    pub fn argument(&self, name: &str) -> Option<&str> {
        self.arguments.get(name).map(String::as_str)
    }

    /// Check whether a caller argument was supplied
    pub fn has_argument(&self, name: &str) -> bool {
        self.arguments.contains_key(name)
    }

    /// Read an environment variable of the current process
    pub fn env(&self, name: &str) -> Option<String> {
        env::var(name).ok()
    }

    /// Set a single variable
    pub fn set_var(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Get a variable value
    pub fn get_var(&self, key: &str) -> Option<&String> {
        self.vars.get(key)
    }

    /// Arguments overlaid with run variables, used for interpolation
    pub fn variables(&self) -> HashMap<String, String> {
        let mut merged = self.arguments.clone();
        merged.extend(self.vars.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
