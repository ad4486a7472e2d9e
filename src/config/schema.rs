//! Configuration validation
//!
//! Structural checks on a parsed build file. Task references in `depends`
//! and `before` are left to the resolver, since a target only needs the
//! tasks it reaches.

use crate::config::types::{Command, Config, Task, When};
use crate::error::{ConfigError, ConfigResult};
use crate::runner::{When as RuntimeWhen, WhenCondition};

/// Validate a complete configuration
pub fn validate_config(config: &Config) -> ConfigResult<()> {
    if let Some(interpreter) = &config.interpreter {
        if interpreter.is_empty() {
            return Err(ConfigError::Invalid("interpreter cannot be empty".to_string()));
        }
    }

    for hooks in [&config.setup, &config.teardown, &config.task_setup, &config.task_teardown] {
        validate_commands("<global>", hooks)?;
    }

    for (name, task) in &config.tasks {
        validate_task(name, task)?;
    }

    Ok(())
}

/// Validate a single task
pub fn validate_task(name: &str, task: &Task) -> ConfigResult<()> {
    if name.trim().is_empty() {
        return Err(ConfigError::Invalid("task names cannot be empty".to_string()));
    }

    for when in &task.when {
        convert_when(name, when)?;
    }

    for commands in [
        &task.setup,
        &task.run,
        &task.on_error,
        &task.report_error,
        &task.finally,
        &task.teardown,
    ] {
        validate_commands(name, commands)?;
    }

    Ok(())
}

fn validate_commands(owner: &str, commands: &[Command]) -> ConfigResult<()> {
    for command in commands {
        let exec = match command {
            Command::Simple(exec) => exec,
            Command::Complex(detail) => &detail.exec,
        };
        if exec.trim().is_empty() {
            return Err(ConfigError::Invalid(format!("'{owner}' has an empty command")));
        }
    }
    Ok(())
}

/// Convert a build-file condition into its runtime form
pub fn convert_when(task: &str, when: &When) -> ConfigResult<RuntimeWhen> {
    let mut conditions = Vec::new();

    if let Some(eq) = &when.equal {
        conditions.push(WhenCondition::Equal {
            left: eq.left.clone(),
            right: eq.right.clone(),
        });
    }
    if let Some(ne) = &when.not_equal {
        conditions.push(WhenCondition::NotEqual {
            left: ne.left.clone(),
            right: ne.right.clone(),
        });
    }
    if let Some(cmd) = &when.command {
        conditions.push(WhenCondition::Command(cmd.clone()));
    }
    if let Some(path) = &when.exists {
        conditions.push(WhenCondition::Exists(path.clone()));
    }
    if let Some(var) = &when.env_set {
        conditions.push(WhenCondition::EnvSet(var.clone()));
    }
    if let Some(var) = &when.env_not_set {
        conditions.push(WhenCondition::EnvNotSet(var.clone()));
    }
    if let Some(arg) = &when.arg_set {
        conditions.push(WhenCondition::ArgSet(arg.clone()));
    }
    if let Some(arg) = &when.arg_not_set {
        conditions.push(WhenCondition::ArgNotSet(arg.clone()));
    }

    let invalid = |reason: &str| ConfigError::InvalidCondition {
        task: task.to_string(),
        reason: reason.to_string(),
    };

    match conditions.len() {
        0 => Err(invalid("no condition given")),
        1 => Ok(RuntimeWhen {
            condition: conditions.remove(0),
            reason: when.reason.clone(),
        }),
        _ => Err(invalid("only one condition may be given per entry")),
    }
}
