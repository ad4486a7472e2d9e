//! Task registry
//!
//! Append-only, name-unique collection of tasks. Registration order is kept
//! and used by the resolver to break ordering ties.

use crate::error::RegistryError;
use crate::task::{Task, TaskBuilder};
use indexmap::IndexMap;

#[derive(Debug, Default)]
pub struct Registry {
    tasks: IndexMap<String, Task>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new task and return a builder to configure it
    pub fn register(&mut self, name: impl Into<String>) -> Result<TaskBuilder<'_>, RegistryError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.contains(&name) {
            return Err(RegistryError::DuplicateTask(name));
        }

        let entry = self.tasks.entry(name.clone()).or_insert_with(|| Task::new(name));
        Ok(TaskBuilder::new(entry))
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    /// Case-sensitive membership check
    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Position of the task in registration order
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.tasks.get_index_of(name)
    }

    pub fn get_index(&self, index: usize) -> Option<&Task> {
        self.tasks.get_index(index).map(|(_, task)| task)
    }

    /// Tasks in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
