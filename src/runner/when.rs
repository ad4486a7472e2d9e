//! When condition evaluation
//!
//! Build-file `when` entries become task criteria. They are evaluated
//! lazily against the live context, so they see arguments, the environment
//! and variables set by tasks that ran earlier in the same run.

use crate::error::CommandResult;
use crate::runner::{check_command, interpolate, Context};
use crate::task::Criterion;
use std::env;

/// Conditions understood in a build file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhenCondition {
    Equal { left: String, right: String },
    NotEqual { left: String, right: String },
    Command(String),
    /// Glob pattern relative to the working directory
    Exists(String),
    EnvSet(String),
    EnvNotSet(String),
    ArgSet(String),
    ArgNotSet(String),
}

/// A condition with an optional skip reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct When {
    pub condition: WhenCondition,
    pub reason: Option<String>,
}

impl When {
    pub fn new(condition: WhenCondition) -> Self {
        When {
            condition,
            reason: None,
        }
    }

    /// Turn this condition into a task criterion
    pub fn into_criterion(self) -> Criterion {
        let reason = self.reason.clone().or_else(|| Some(self.describe()));
        let condition = self.condition;
        Criterion::new(
            Box::new(move |ctx: &Context| -> anyhow::Result<bool> {
                Ok(evaluate_condition(&condition, ctx)?)
            }),
            reason,
        )
    }

    /// Default skip reason derived from the condition
    pub fn describe(&self) -> String {
        match &self.condition {
            WhenCondition::Equal { left, right } => format!("'{left}' is not equal to '{right}'"),
            WhenCondition::NotEqual { left, right } => format!("'{left}' is equal to '{right}'"),
            WhenCondition::Command(cmd) => format!("command '{cmd}' failed"),
            WhenCondition::Exists(path) => format!("'{path}' does not exist"),
            WhenCondition::EnvSet(var) => format!("environment variable '{var}' is not set"),
            WhenCondition::EnvNotSet(var) => format!("environment variable '{var}' is set"),
            WhenCondition::ArgSet(arg) => format!("argument '{arg}' was not given"),
            WhenCondition::ArgNotSet(arg) => format!("argument '{arg}' was given"),
        }
    }
}

/// Evaluate a single condition
pub fn evaluate_condition(condition: &WhenCondition, ctx: &Context) -> CommandResult<bool> {
    let vars = ctx.variables();
    let expand = |s: &str| interpolate(s, &vars);

    match condition {
        WhenCondition::Equal { left, right } => Ok(expand(left)? == expand(right)?),

        WhenCondition::NotEqual { left, right } => Ok(expand(left)? != expand(right)?),

        WhenCondition::Command(cmd) => check_command(cmd, ctx),

        WhenCondition::Exists(pattern) => {
            let pattern = ctx.working_dir.join(expand(pattern)?);
            let found = glob::glob(&pattern.to_string_lossy())
                .map(|mut paths| paths.any(|p| p.is_ok()))
                .unwrap_or_else(|_| pattern.exists());
            Ok(found)
        }

        WhenCondition::EnvSet(var_name) => Ok(env::var(expand(var_name)?).is_ok()),

        WhenCondition::EnvNotSet(var_name) => Ok(env::var(expand(var_name)?).is_err()),

        WhenCondition::ArgSet(name) => Ok(ctx.has_argument(name) || ctx.vars.contains_key(name)),

        WhenCondition::ArgNotSet(name) => Ok(!ctx.has_argument(name) && !ctx.vars.contains_key(name)),
    }
}
