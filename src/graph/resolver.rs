//! Dependency resolution
//!
//! Turns a registry and a target name into an [`ExecutionPlan`].
//!
//! An edge `A -> B` means "A runs before B". A dependency of `B` on `A` and a
//! dependee declaration of `B` on `A` both produce that edge. The plan only
//! contains the target and the tasks it transitively depends on; dependee
//! declarations order tasks that are already in the plan but never pull new
//! ones in.

use crate::error::{ReferenceKind, ResolveError, ResolveResult};
use crate::graph::ExecutionPlan;
use crate::task::Registry;
use tracing::debug;

/// Options influencing plan construction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Only run the target itself, ignoring its dependencies
    pub exclusive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Visiting,
    Visited,
}

/// Validated task graph over a registry
#[derive(Debug)]
pub struct DependencyResolver<'r> {
    registry: &'r Registry,
    /// Declared dependencies per task, by registration index
    requires: Vec<Vec<usize>>,
    /// Every task that must precede each task, sorted by registration index
    predecessors: Vec<Vec<usize>>,
}

impl<'r> DependencyResolver<'r> {
    /// Build the graph, failing on the first reference to an unknown task
    pub fn new(registry: &'r Registry) -> ResolveResult<Self> {
        let count = registry.len();
        let mut requires = vec![Vec::new(); count];
        let mut predecessors = vec![Vec::new(); count];

        for (index, task) in registry.iter().enumerate() {
            for dependency in &task.dependencies {
                let from = lookup(registry, &task.name, dependency, ReferenceKind::Dependency)?;
                requires[index].push(from);
                predecessors[index].push(from);
            }
            for dependee in &task.dependees {
                let to = lookup(registry, &task.name, dependee, ReferenceKind::Dependee)?;
                predecessors[to].push(index);
            }
        }

        for list in &mut predecessors {
            list.sort_unstable();
            list.dedup();
        }

        Ok(DependencyResolver {
            registry,
            requires,
            predecessors,
        })
    }

    /// Compute the execution plan for `target`
    pub fn resolve(&self, target: &str, options: ResolveOptions) -> ResolveResult<ExecutionPlan<'r>> {
        let root = self
            .registry
            .index_of(target)
            .ok_or_else(|| ResolveError::TargetNotFound(target.to_string()))?;

        if options.exclusive {
            debug!(requested = %target, "exclusive run, ignoring dependencies");
            let tasks = self.registry.get_index(root).into_iter().collect();
            return Ok(ExecutionPlan::new(target, tasks));
        }

        let included = self.required_by(root);
        let mut marks = vec![Mark::Unvisited; self.registry.len()];
        let mut stack = Vec::new();
        let mut order = Vec::new();
        self.visit(root, &included, &mut marks, &mut stack, &mut order)?;

        let tasks: Vec<_> = order
            .into_iter()
            .filter_map(|index| self.registry.get_index(index))
            .collect();
        debug!(
            requested = %target,
            plan = ?tasks.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            "resolved execution plan"
        );
        Ok(ExecutionPlan::new(target, tasks))
    }

    /// Tasks transitively required by `root`, including itself
    fn required_by(&self, root: usize) -> Vec<bool> {
        let mut included = vec![false; self.registry.len()];
        let mut pending = vec![root];
        while let Some(index) = pending.pop() {
            if included[index] {
                continue;
            }
            included[index] = true;
            pending.extend(self.requires[index].iter().filter(|&&dep| !included[dep]));
        }
        included
    }

    /// Depth-first post-order walk over predecessors
    fn visit(
        &self,
        index: usize,
        included: &[bool],
        marks: &mut [Mark],
        stack: &mut Vec<usize>,
        order: &mut Vec<usize>,
    ) -> ResolveResult<()> {
        match marks[index] {
            Mark::Visited => return Ok(()),
            Mark::Visiting => return Err(self.cycle_error(index, stack)),
            Mark::Unvisited => {}
        }

        marks[index] = Mark::Visiting;
        stack.push(index);

        for &predecessor in &self.predecessors[index] {
            if included[predecessor] {
                self.visit(predecessor, included, marks, stack, order)?;
            }
        }

        stack.pop();
        marks[index] = Mark::Visited;
        order.push(index);
        Ok(())
    }

    fn cycle_error(&self, index: usize, stack: &[usize]) -> ResolveError {
        let start = stack.iter().position(|&i| i == index).unwrap_or(0);
        let path = stack[start..]
            .iter()
            .chain(std::iter::once(&index))
            .filter_map(|&i| self.registry.get_index(i))
            .map(|task| task.name.clone())
            .collect();
        ResolveError::CyclicDependency { path }
    }
}

fn lookup(
    registry: &Registry,
    task: &str,
    reference: &str,
    kind: ReferenceKind,
) -> ResolveResult<usize> {
    registry
        .index_of(reference)
        .ok_or_else(|| ResolveError::DependencyNotFound {
            task: task.to_string(),
            dependency: reference.to_string(),
            kind,
        })
}

/// Resolve `target` against `registry` with default options
pub fn resolve<'r>(registry: &'r Registry, target: &str) -> ResolveResult<ExecutionPlan<'r>> {
    resolve_with(registry, target, ResolveOptions::default())
}

/// Resolve `target` against `registry`
pub fn resolve_with<'r>(
    registry: &'r Registry,
    target: &str,
    options: ResolveOptions,
) -> ResolveResult<ExecutionPlan<'r>> {
    if !registry.contains(target) {
        return Err(ResolveError::TargetNotFound(target.to_string()));
    }
    DependencyResolver::new(registry)?.resolve(target, options)
}
