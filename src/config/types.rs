//! Core configuration types
//!
//! This module defines the data structures that represent a bake.yml build file.

use indexmap::IndexMap;
use serde::Deserialize;

/// Top-level configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Project name (optional)
    #[serde(default)]
    pub name: Option<String>,

    /// Project description (optional)
    #[serde(default)]
    pub description: Option<String>,

    /// Target run when none is given on the command line
    #[serde(default)]
    pub default: Option<String>,

    /// Global interpreter to use for commands (e.g., ["sh", "-c"])
    #[serde(default)]
    pub interpreter: Option<Vec<String>>,

    /// Dotenv file loaded before the run
    #[serde(rename = "env-file", default)]
    pub env_file: Option<String>,

    /// Runs once before the first task
    #[serde(default, deserialize_with = "deserialize_commands")]
    pub setup: Vec<Command>,

    /// Runs once after the last task
    #[serde(default, deserialize_with = "deserialize_commands")]
    pub teardown: Vec<Command>,

    /// Runs before every executed task
    #[serde(rename = "task-setup", default, deserialize_with = "deserialize_commands")]
    pub task_setup: Vec<Command>,

    /// Runs after every executed task
    #[serde(rename = "task-teardown", default, deserialize_with = "deserialize_commands")]
    pub task_teardown: Vec<Command>,

    /// Tasks in declaration order
    #[serde(default)]
    pub tasks: IndexMap<String, Task>,
}

/// A task definition
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Task {
    /// Description shown by `--list`
    #[serde(default)]
    pub description: Option<String>,

    /// Tasks that must run before this one
    #[serde(default, deserialize_with = "deserialize_names")]
    pub depends: Vec<String>,

    /// Tasks that must run after this one
    #[serde(default, deserialize_with = "deserialize_names")]
    pub before: Vec<String>,

    /// Criteria gating the task
    #[serde(default)]
    pub when: Vec<When>,

    /// Keep running the plan if this task fails
    #[serde(rename = "continue-on-error", default)]
    pub continue_on_error: bool,

    /// Run every command even if an earlier one fails
    #[serde(rename = "defer-on-error", default)]
    pub defer_on_error: bool,

    /// Task-scoped setup
    #[serde(default, deserialize_with = "deserialize_commands")]
    pub setup: Vec<Command>,

    /// Commands to execute, one action each
    #[serde(default, deserialize_with = "deserialize_commands")]
    pub run: Vec<Command>,

    /// Error handler
    #[serde(rename = "on-error", default, deserialize_with = "deserialize_commands")]
    pub on_error: Vec<Command>,

    /// Error reporter
    #[serde(rename = "report-error", default, deserialize_with = "deserialize_commands")]
    pub report_error: Vec<Command>,

    /// Finally block - always executes, even on error
    #[serde(default, deserialize_with = "deserialize_commands")]
    pub finally: Vec<Command>,

    /// Task-scoped teardown
    #[serde(default, deserialize_with = "deserialize_commands")]
    pub teardown: Vec<Command>,

    /// Include another file as task definition
    #[serde(default)]
    pub include: Option<String>,
}

/// A command to execute
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Command {
    /// Simple string command
    Simple(String),

    /// Complex command with additional options
    Complex(CommandDetail),
}

/// Detailed command form
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandDetail {
    /// The command to execute
    pub exec: String,

    /// What to print when running (defaults to exec)
    #[serde(default)]
    pub print: Option<String>,

    /// Whether to suppress the command echo
    #[serde(default)]
    pub quiet: bool,

    /// Working directory for the command
    #[serde(default)]
    pub dir: Option<String>,
}

/// A conditional expression; exactly one condition must be set
#[derive(Debug, Clone, Default, Deserialize)]
pub struct When {
    /// Check if values are equal
    #[serde(default)]
    pub equal: Option<WhenComparison>,

    /// Check if values are not equal
    #[serde(rename = "not-equal", default)]
    pub not_equal: Option<WhenComparison>,

    /// Check if a command succeeds
    #[serde(default)]
    pub command: Option<String>,

    /// Check if a path or glob pattern matches
    #[serde(default)]
    pub exists: Option<String>,

    /// Check if environment variable is set
    #[serde(rename = "env-set", default)]
    pub env_set: Option<String>,

    /// Check if environment variable is not set
    #[serde(rename = "env-not-set", default)]
    pub env_not_set: Option<String>,

    /// Check if an argument was given
    #[serde(rename = "arg-set", default)]
    pub arg_set: Option<String>,

    /// Check if an argument was not given
    #[serde(rename = "arg-not-set", default)]
    pub arg_not_set: Option<String>,

    /// Reason reported when the task is skipped
    #[serde(default)]
    pub reason: Option<String>,
}

/// A comparison for when conditions
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WhenComparison {
    /// Left-hand side of comparison
    pub left: String,

    /// Right-hand side of comparison
    pub right: String,
}

/// Custom deserializer for commands that handles both single values and arrays
fn deserialize_commands<'de, D>(deserializer: D) -> Result<Vec<Command>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    let value = Value::deserialize(deserializer)?;

    match value {
        // Single string or complex command
        Value::String(s) => Ok(vec![Command::Simple(s)]),
        Value::Mapping(_) => {
            let cmd = Command::deserialize(value).map_err(D::Error::custom)?;
            Ok(vec![cmd])
        }
        // Array of commands
        Value::Sequence(seq) => seq
            .into_iter()
            .map(|item| Command::deserialize(item).map_err(D::Error::custom))
            .collect(),
        // Null or not present
        Value::Null => Ok(Vec::new()),
        _ => Err(D::Error::custom("command must be a string, object, or array")),
    }
}

/// Custom deserializer for task names given as a single string or an array
fn deserialize_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(vec![s]),
        Value::Sequence(seq) => seq
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                other => Err(D::Error::custom(format!("task name must be a string, got {other:?}"))),
            })
            .collect(),
        Value::Null => Ok(Vec::new()),
        _ => Err(D::Error::custom("task names must be a string or array")),
    }
}
