//! Fluent task configuration
//!
//! Returned by [`Registry::register`](crate::task::Registry::register).

use crate::runner::Context;
use crate::task::{Criterion, Task};

/// Configures a freshly registered task
pub struct TaskBuilder<'a> {
    task: &'a mut Task,
}

impl<'a> TaskBuilder<'a> {
    pub(crate) fn new(task: &'a mut Task) -> Self {
        TaskBuilder { task }
    }

    /// Name of the task being configured
    pub fn name(&self) -> &str {
        &self.task.name
    }

    pub fn description(self, description: impl Into<String>) -> Self {
        self.task.description = Some(description.into());
        self
    }

    /// Run `dependency` before this task
    pub fn is_dependent_on(self, dependency: impl Into<String>) -> Self {
        let dependency = dependency.into();
        if !self.task.dependencies.contains(&dependency) {
            self.task.dependencies.push(dependency);
        }
        self
    }

    /// Run this task before `dependee`
    pub fn is_dependee_of(self, dependee: impl Into<String>) -> Self {
        let dependee = dependee.into();
        if !self.task.dependees.contains(&dependee) {
            self.task.dependees.push(dependee);
        }
        self
    }

    /// Skip the task when `predicate` returns false
    pub fn with_criteria<F>(self, predicate: F) -> Self
    where
        F: Fn(&Context) -> bool + 'static,
    {
        self.with_fallible_criteria(move |ctx| Ok(predicate(ctx)), None)
    }

    /// Like [`with_criteria`](Self::with_criteria) with a skip reason
    pub fn with_criteria_reason<F>(self, predicate: F, reason: impl Into<String>) -> Self
    where
        F: Fn(&Context) -> bool + 'static,
    {
        self.with_fallible_criteria(move |ctx| Ok(predicate(ctx)), Some(reason.into()))
    }

    /// Criterion whose evaluation may itself fail
    pub fn with_fallible_criteria<F>(self, predicate: F, reason: Option<String>) -> Self
    where
        F: Fn(&Context) -> anyhow::Result<bool> + 'static,
    {
        self.push_criterion(Box::new(predicate), reason)
    }

    /// Append a prepared criterion
    pub fn with_criterion(self, criterion: Criterion) -> Self {
        self.task.criteria.push(criterion);
        self
    }

    fn push_criterion(
        self,
        predicate: Box<dyn Fn(&Context) -> anyhow::Result<bool>>,
        reason: Option<String>,
    ) -> Self {
        self.task.criteria.push(Criterion::new(predicate, reason));
        self
    }

    /// Append an action
    pub fn does<F>(self, action: F) -> Self
    where
        F: Fn(&mut Context) -> anyhow::Result<()> + 'static,
    {
        self.task.actions.push(Box::new(action));
        self
    }

    pub fn continue_on_error(self) -> Self {
        self.task.continue_on_error = true;
        self
    }

    pub fn defer_on_error(self) -> Self {
        self.task.defer_on_error = true;
        self
    }

    pub fn report_error<F>(self, reporter: F) -> Self
    where
        F: Fn(&anyhow::Error, &mut Context) -> anyhow::Result<()> + 'static,
    {
        self.task.error_reporter = Some(Box::new(reporter));
        self
    }

    pub fn on_error<F>(self, handler: F) -> Self
    where
        F: Fn(&anyhow::Error, &mut Context) -> anyhow::Result<()> + 'static,
    {
        self.task.error_handler = Some(Box::new(handler));
        self
    }

    pub fn finally<F>(self, handler: F) -> Self
    where
        F: Fn(&mut Context) -> anyhow::Result<()> + 'static,
    {
        self.task.finally_handler = Some(Box::new(handler));
        self
    }

    pub fn setup<F>(self, action: F) -> Self
    where
        F: Fn(&mut Context) -> anyhow::Result<()> + 'static,
    {
        self.task.setup = Some(Box::new(action));
        self
    }

    pub fn teardown<F>(self, action: F) -> Self
    where
        F: Fn(&mut Context) -> anyhow::Result<()> + 'static,
    {
        self.task.teardown = Some(Box::new(action));
        self
    }
}
