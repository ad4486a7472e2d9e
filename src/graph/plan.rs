//! Execution plan

use crate::task::Task;

/// Ordered tasks for one run. Computed fresh for every target and never reused.
#[derive(Debug, Clone)]
pub struct ExecutionPlan<'r> {
    target: String,
    tasks: Vec<&'r Task>,
}

impl<'r> ExecutionPlan<'r> {
    pub(crate) fn new(target: impl Into<String>, tasks: Vec<&'r Task>) -> Self {
        ExecutionPlan {
            target: target.into(),
            tasks,
        }
    }

    /// The requested target
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn tasks(&self) -> &[&'r Task] {
        &self.tasks
    }

    pub fn iter(&self) -> impl Iterator<Item = &'r Task> + '_ {
        self.tasks.iter().copied()
    }

    /// Task names in execution order
    pub fn names(&self) -> Vec<&'r str> {
        self.tasks.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
