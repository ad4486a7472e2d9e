//! Task definition types
//!
//! A task is a named unit of work. Tasks are mutated only while the registry
//! is being populated and are read-only once a run begins.

use crate::runner::Context;
use std::fmt;

/// A unit of work performed by a task, a hook, or a finally block
pub type Action = Box<dyn Fn(&mut Context) -> anyhow::Result<()>>;

/// Invoked with the failure of a task's actions
pub type ErrorHandler = Box<dyn Fn(&anyhow::Error, &mut Context) -> anyhow::Result<()>>;

/// Predicate gating whether a task runs
pub type Predicate = Box<dyn Fn(&Context) -> anyhow::Result<bool>>;

/// Reason recorded when a criterion without its own message skips a task
pub const DEFAULT_SKIP_REASON: &str = "Criteria not met";

/// A single criterion with an optional skip reason
pub struct Criterion {
    predicate: Predicate,
    reason: Option<String>,
}

impl Criterion {
    pub fn new(predicate: Predicate, reason: Option<String>) -> Self {
        Criterion { predicate, reason }
    }

    /// Evaluate the predicate against the live context
    pub fn evaluate(&self, ctx: &Context) -> anyhow::Result<bool> {
        (self.predicate)(ctx)
    }

    /// Reason reported when this criterion skips a task
    pub fn reason(&self) -> &str {
        self.reason.as_deref().unwrap_or(DEFAULT_SKIP_REASON)
    }
}

impl fmt::Debug for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Criterion")
            .field("reason", &self.reason)
            .finish_non_exhaustive()
    }
}

/// Registered task
pub struct Task {
    /// Unique task name
    pub name: String,

    /// Human readable description
    pub description: Option<String>,

    /// Actions, run in order
    pub actions: Vec<Action>,

    /// Tasks that must run before this one
    pub dependencies: Vec<String>,

    /// Tasks that must run after this one
    pub dependees: Vec<String>,

    /// Criteria, evaluated in order at execution time
    pub criteria: Vec<Criterion>,

    /// Keep running the plan if this task fails
    pub continue_on_error: bool,

    /// Run every action even if an earlier one fails
    pub defer_on_error: bool,

    /// Observes a failure before the error handler
    pub error_reporter: Option<ErrorHandler>,

    /// Handles a failure; an error it returns replaces the original
    pub error_handler: Option<ErrorHandler>,

    /// Always runs after the actions
    pub finally_handler: Option<Action>,

    /// Task-scoped setup
    pub setup: Option<Action>,

    /// Task-scoped teardown
    pub teardown: Option<Action>,
}

impl Task {
    /// Create an empty task
    pub fn new(name: impl Into<String>) -> Self {
        Task {
            name: name.into(),
            description: None,
            actions: Vec::new(),
            dependencies: Vec::new(),
            dependees: Vec::new(),
            criteria: Vec::new(),
            continue_on_error: false,
            defer_on_error: false,
            error_reporter: None,
            error_handler: None,
            finally_handler: None,
            setup: None,
            teardown: None,
        }
    }

    /// Returns the first criterion that evaluates to false
    pub fn failing_criterion(&self, ctx: &Context) -> anyhow::Result<Option<&Criterion>> {
        for criterion in &self.criteria {
            if !criterion.evaluate(ctx)? {
                return Ok(Some(criterion));
            }
        }
        Ok(None)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("actions", &self.actions.len())
            .field("dependencies", &self.dependencies)
            .field("dependees", &self.dependees)
            .field("criteria", &self.criteria)
            .field("continue_on_error", &self.continue_on_error)
            .field("defer_on_error", &self.defer_on_error)
            .field("error_handler", &self.error_handler.is_some())
            .field("finally_handler", &self.finally_handler.is_some())
            .finish_non_exhaustive()
    }
}
