//! Task engine
//!
//! Resolves a target into a plan and walks it through an
//! [`ExecutionStrategy`], producing a [`Report`].
//!
//! Per run: global setup, then every planned task (criteria, task setup,
//! actions, error handling, finally, task teardown), then global teardown.
//! Global teardown runs exactly once on every exit path that is not a
//! resolution failure, and its own failure never masks an earlier one.

use crate::error::{BakeError, ExecutionError, RegistryError, Result};
use crate::graph::{resolve_with, ExecutionPlan, ResolveOptions};
use crate::report::{EntryCategory, Report, TaskStatus};
use crate::runner::{strategy_for, Context, ExecutionStrategy};
use crate::task::{Action, Registry, Task, TaskBuilder};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Name used for the global setup entry in a report
pub const SETUP_ENTRY: &str = "Setup";

/// Name used for the global teardown entry in a report
pub const TEARDOWN_ENTRY: &str = "Teardown";

/// What to run and how
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub target: String,
    /// Simulate the run instead of executing it
    pub dry_run: bool,
    /// Run only the target, not its dependencies
    pub exclusive: bool,
}

impl EngineSettings {
    pub fn new(target: impl Into<String>) -> Self {
        EngineSettings {
            target: target.into(),
            dry_run: false,
            exclusive: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_exclusive(mut self, exclusive: bool) -> Self {
        self.exclusive = exclusive;
        self
    }
}

/// Owns the registry and the run-wide hooks
#[derive(Default)]
pub struct Engine {
    registry: Registry,
    setup: Option<Action>,
    teardown: Option<Action>,
    task_setup: Option<Action>,
    task_teardown: Option<Action>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine over an already populated registry
    pub fn with_registry(registry: Registry) -> Self {
        Engine {
            registry,
            ..Self::default()
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Register a task; see [`Registry::register`]
    pub fn register_task(&mut self, name: impl Into<String>) -> std::result::Result<TaskBuilder<'_>, RegistryError> {
        self.registry.register(name)
    }

    /// Runs once before the first task
    pub fn register_setup<F>(&mut self, action: F)
    where
        F: Fn(&mut Context) -> anyhow::Result<()> + 'static,
    {
        self.setup = Some(Box::new(action));
    }

    /// Runs once after the last task, on success and on failure
    pub fn register_teardown<F>(&mut self, action: F)
    where
        F: Fn(&mut Context) -> anyhow::Result<()> + 'static,
    {
        self.teardown = Some(Box::new(action));
    }

    /// Runs before every executed task
    pub fn register_task_setup<F>(&mut self, action: F)
    where
        F: Fn(&mut Context) -> anyhow::Result<()> + 'static,
    {
        self.task_setup = Some(Box::new(action));
    }

    /// Runs after every executed task
    pub fn register_task_teardown<F>(&mut self, action: F)
    where
        F: Fn(&mut Context) -> anyhow::Result<()> + 'static,
    {
        self.task_teardown = Some(Box::new(action));
    }

    /// Run with the strategy selected by `settings`
    pub fn run(&self, settings: &EngineSettings, ctx: &mut Context) -> Result<Report> {
        let strategy = strategy_for(settings.dry_run);
        let options = ResolveOptions {
            exclusive: settings.exclusive,
        };
        self.run_target_with(&settings.target, options, strategy.as_ref(), ctx)
    }

    /// Resolve `target` and execute its plan
    pub fn run_target(&self, target: &str, strategy: &dyn ExecutionStrategy, ctx: &mut Context) -> Result<Report> {
        self.run_target_with(target, ResolveOptions::default(), strategy, ctx)
    }

    pub fn run_target_with(
        &self,
        target: &str,
        options: ResolveOptions,
        strategy: &dyn ExecutionStrategy,
        ctx: &mut Context,
    ) -> Result<Report> {
        let plan = resolve_with(&self.registry, target, options)?;
        let mut report = Report::new();

        if let Some(setup) = &self.setup {
            let start = Instant::now();
            if let Err(source) = strategy.perform_setup(setup, ctx) {
                error!("An error occurred in the custom setup action: {source:#}");
                if let Err(teardown_error) = self.run_teardown(strategy, ctx, &mut report) {
                    warn!("Teardown failed after setup failure: {teardown_error:#}");
                }
                return Err(ExecutionError::Setup { source }.into());
            }
            record_completed(&mut report, strategy, SETUP_ENTRY, EntryCategory::Setup, start.elapsed());
        }

        let outcome = self.run_plan(&plan, strategy, ctx, &mut report);
        let teardown = self.run_teardown(strategy, ctx, &mut report);

        match (outcome, teardown) {
            (Err(failure), Err(teardown_error)) => {
                warn!("Teardown failed during an aborted run: {teardown_error:#}");
                Err(failure.into())
            }
            (Err(failure), Ok(())) => Err(failure.into()),
            (Ok(()), Err(source)) => Err(BakeError::Execution(ExecutionError::Teardown { source })),
            (Ok(()), Ok(())) => {
                info!(
                    requested = %target,
                    tasks = report.tasks().count(),
                    duration = ?report.total_duration(),
                    "Run completed"
                );
                Ok(report)
            }
        }
    }

    fn run_plan(
        &self,
        plan: &ExecutionPlan<'_>,
        strategy: &dyn ExecutionStrategy,
        ctx: &mut Context,
        report: &mut Report,
    ) -> std::result::Result<(), ExecutionError> {
        for task in plan.iter() {
            ctx.current_task = Some(task.name.clone());
            let result = self.run_task(task, strategy, ctx, report);
            ctx.current_task = None;
            result?;
        }
        Ok(())
    }

    fn run_task(
        &self,
        task: &Task,
        strategy: &dyn ExecutionStrategy,
        ctx: &mut Context,
        report: &mut Report,
    ) -> std::result::Result<(), ExecutionError> {
        match strategy.evaluate_criteria(task, ctx) {
            Ok(Some(reason)) => {
                info!(task = %task.name, "Skipping task: {reason}");
                report.add_skipped(&task.name, reason);
                return Ok(());
            }
            Ok(None) => {}
            Err(source) => {
                error!(task = %task.name, "Criteria evaluation failed: {source:#}");
                report.add_failed(&task.name, EntryCategory::Task, Duration::ZERO, format!("{source:#}"));
                return Err(ExecutionError::Task {
                    task: task.name.clone(),
                    source,
                });
            }
        }

        info!(task = %task.name, "Executing task");
        let start = Instant::now();

        let mut result = self.perform_task(task, strategy, ctx);

        if let Some(finally) = &task.finally_handler {
            merge_failure(&mut result, strategy.invoke_finally(task, finally, ctx), task, "finally handler");
        }
        if let Some(teardown) = &task.teardown {
            merge_failure(&mut result, strategy.perform_task_teardown(task, teardown, ctx), task, "task teardown");
        }
        if let Some(teardown) = &self.task_teardown {
            merge_failure(&mut result, strategy.perform_task_teardown(task, teardown, ctx), task, "task teardown");
        }

        let duration = start.elapsed();
        match result {
            Ok(()) => {
                info!(task = %task.name, ?duration, "Finished executing task");
                record_completed(report, strategy, &task.name, EntryCategory::Task, duration);
                Ok(())
            }
            Err(source) => {
                report.add_failed(&task.name, EntryCategory::Task, duration, format!("{source:#}"));
                if task.continue_on_error {
                    warn!(task = %task.name, "Continuing after task failure: {source:#}");
                    Ok(())
                } else {
                    Err(ExecutionError::Task {
                        task: task.name.clone(),
                        source,
                    })
                }
            }
        }
    }

    /// Task setup and actions, then reporter and handler on failure
    fn perform_task(&self, task: &Task, strategy: &dyn ExecutionStrategy, ctx: &mut Context) -> anyhow::Result<()> {
        let error = match self.setup_and_execute(task, strategy, ctx) {
            Ok(()) => return Ok(()),
            Err(error) => error,
        };
        error!(task = %task.name, "An error occurred when executing task: {error:#}");

        if let Some(reporter) = &task.error_reporter {
            if let Err(e) = strategy.report_errors(task, reporter, &error, ctx) {
                warn!(task = %task.name, "Error reporter failed: {e:#}");
            }
        }

        match &task.error_handler {
            Some(handler) => match strategy.handle_errors(task, handler, &error, ctx) {
                Ok(()) => Err(error),
                Err(replacement) => {
                    warn!(task = %task.name, "Error handler raised a new error, replacing the original");
                    Err(replacement)
                }
            },
            None => Err(error),
        }
    }

    fn setup_and_execute(&self, task: &Task, strategy: &dyn ExecutionStrategy, ctx: &mut Context) -> anyhow::Result<()> {
        if let Some(setup) = &self.task_setup {
            strategy.perform_task_setup(task, setup, ctx)?;
        }
        if let Some(setup) = &task.setup {
            strategy.perform_task_setup(task, setup, ctx)?;
        }
        strategy.execute(task, ctx)
    }

    fn run_teardown(
        &self,
        strategy: &dyn ExecutionStrategy,
        ctx: &mut Context,
        report: &mut Report,
    ) -> anyhow::Result<()> {
        let Some(teardown) = &self.teardown else {
            return Ok(());
        };

        let start = Instant::now();
        match strategy.perform_teardown(teardown, ctx) {
            Ok(()) => {
                record_completed(report, strategy, TEARDOWN_ENTRY, EntryCategory::Teardown, start.elapsed());
                Ok(())
            }
            Err(e) => {
                error!("An error occurred in the custom teardown action: {e:#}");
                report.add_failed(TEARDOWN_ENTRY, EntryCategory::Teardown, start.elapsed(), format!("{e:#}"));
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("registry", &self.registry)
            .field("setup", &self.setup.is_some())
            .field("teardown", &self.teardown.is_some())
            .field("task_setup", &self.task_setup.is_some())
            .field("task_teardown", &self.task_teardown.is_some())
            .finish()
    }
}

fn record_completed(
    report: &mut Report,
    strategy: &dyn ExecutionStrategy,
    name: &str,
    category: EntryCategory,
    duration: Duration,
) {
    match strategy.completed_status() {
        TaskStatus::DryRun => report.add_dry_run(name, category),
        _ => report.add_executed(name, category, duration),
    }
}

/// Keep the first failure; a later one only fails a task that had succeeded
fn merge_failure(result: &mut anyhow::Result<()>, later: anyhow::Result<()>, task: &Task, stage: &str) {
    if let Err(e) = later {
        if result.is_ok() {
            error!(task = %task.name, "{stage} failed: {e:#}");
            *result = Err(e);
        } else {
            warn!(task = %task.name, "{stage} failed while handling an earlier failure: {e:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{DefaultStrategy, DryRunStrategy};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Journal = Rc<RefCell<Vec<String>>>;

    fn log(journal: &Journal, entry: &str) -> impl Fn(&mut Context) -> anyhow::Result<()> + 'static {
        let journal = Rc::clone(journal);
        let entry = entry.to_string();
        move |_| {
            journal.borrow_mut().push(entry.clone());
            Ok(())
        }
    }

    fn entries(journal: &Journal) -> Vec<String> {
        journal.borrow().clone()
    }

    #[test]
    fn test_hooks_wrap_every_task() {
        let journal: Journal = Rc::default();
        let mut engine = Engine::new();
        engine.register_setup(log(&journal, "setup"));
        engine.register_teardown(log(&journal, "teardown"));
        engine.register_task_setup(log(&journal, "task-setup"));
        engine.register_task_teardown(log(&journal, "task-teardown"));
        engine
            .register_task("Build")
            .unwrap()
            .setup(log(&journal, "build-setup"))
            .does(log(&journal, "build"))
            .finally(log(&journal, "build-finally"))
            .teardown(log(&journal, "build-teardown"));

        let report = engine
            .run_target("Build", &DefaultStrategy, &mut Context::new())
            .unwrap();

        assert_eq!(
            entries(&journal),
            vec![
                "setup",
                "task-setup",
                "build-setup",
                "build",
                "build-finally",
                "build-teardown",
                "task-teardown",
                "teardown",
            ]
        );
        let categories: Vec<EntryCategory> = report.iter().map(|e| e.category).collect();
        assert_eq!(
            categories,
            vec![EntryCategory::Setup, EntryCategory::Task, EntryCategory::Teardown]
        );
    }

    #[test]
    fn test_setup_failure_skips_plan_but_runs_teardown() {
        let journal: Journal = Rc::default();
        let mut engine = Engine::new();
        engine.register_setup(|_| anyhow::bail!("no toolchain"));
        engine.register_teardown(log(&journal, "teardown"));
        engine.register_task("Build").unwrap().does(log(&journal, "build"));

        let err = engine
            .run_target("Build", &DefaultStrategy, &mut Context::new())
            .unwrap_err();

        assert!(matches!(err, BakeError::Execution(ExecutionError::Setup { .. })));
        assert_eq!(entries(&journal), vec!["teardown"]);
    }

    #[test]
    fn test_teardown_failure_after_success_is_returned() {
        let mut engine = Engine::new();
        engine.register_teardown(|_| anyhow::bail!("cleanup failed"));
        engine.register_task("Build").unwrap().does(|_| Ok(()));

        let err = engine
            .run_target("Build", &DefaultStrategy, &mut Context::new())
            .unwrap_err();
        assert!(matches!(err, BakeError::Execution(ExecutionError::Teardown { .. })));
    }

    #[test]
    fn test_teardown_failure_does_not_mask_task_failure() {
        let mut engine = Engine::new();
        engine.register_teardown(|_| anyhow::bail!("cleanup failed"));
        engine
            .register_task("Build")
            .unwrap()
            .does(|_| anyhow::bail!("compile error"));

        let err = engine
            .run_target("Build", &DefaultStrategy, &mut Context::new())
            .unwrap_err();
        match err {
            BakeError::Execution(ExecutionError::Task { task, source }) => {
                assert_eq!(task, "Build");
                assert_eq!(source.to_string(), "compile error");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_handler_replaces_original_error() {
        let mut engine = Engine::new();
        engine
            .register_task("Publish")
            .unwrap()
            .does(|_| anyhow::bail!("upload failed"))
            .on_error(|e, _| anyhow::bail!("publish aborted: {e}"));

        let err = engine
            .run_target("Publish", &DefaultStrategy, &mut Context::new())
            .unwrap_err();
        assert!(err.to_string().contains("publish aborted: upload failed"));
    }

    #[test]
    fn test_error_handler_that_succeeds_keeps_original_error() {
        let journal: Journal = Rc::default();
        let handled = Rc::clone(&journal);
        let mut engine = Engine::new();
        engine
            .register_task("Publish")
            .unwrap()
            .does(|_| anyhow::bail!("upload failed"))
            .report_error(|_, _| anyhow::bail!("reporter is best effort"))
            .on_error(move |e, _| {
                handled.borrow_mut().push(format!("handled: {e}"));
                Ok(())
            });

        let err = engine
            .run_target("Publish", &DefaultStrategy, &mut Context::new())
            .unwrap_err();
        assert!(err.to_string().contains("upload failed"));
        assert_eq!(entries(&journal), vec!["handled: upload failed"]);
    }

    #[test]
    fn test_finally_failure_fails_successful_task() {
        let mut engine = Engine::new();
        engine
            .register_task("Build")
            .unwrap()
            .does(|_| Ok(()))
            .finally(|_| anyhow::bail!("could not release lock"))
            .continue_on_error();

        let report = engine
            .run_target("Build", &DefaultStrategy, &mut Context::new())
            .unwrap();
        let entry = report.get("Build").unwrap();
        assert_eq!(entry.status, TaskStatus::Failed);
        assert_eq!(entry.reason.as_deref(), Some("could not release lock"));
    }

    #[test]
    fn test_criteria_error_aborts_run() {
        let journal: Journal = Rc::default();
        let mut engine = Engine::new();
        engine.register_teardown(log(&journal, "teardown"));
        engine
            .register_task("Deploy")
            .unwrap()
            .with_fallible_criteria(|_| anyhow::bail!("cannot reach registry"), None)
            .setup(log(&journal, "deploy-setup"))
            .does(log(&journal, "deploy"))
            .teardown(log(&journal, "deploy-teardown"));

        let err = engine
            .run_target("Deploy", &DefaultStrategy, &mut Context::new())
            .unwrap_err();
        assert!(matches!(
            err,
            BakeError::Execution(ExecutionError::Task { ref task, .. }) if task == "Deploy"
        ));
        assert_eq!(entries(&journal), vec!["teardown"]);
    }

    #[test]
    fn test_current_task_is_visible_to_actions() {
        let journal: Journal = Rc::default();
        let seen = Rc::clone(&journal);
        let mut engine = Engine::new();
        engine.register_task_setup(move |ctx| {
            seen.borrow_mut().push(ctx.current_task.clone().unwrap_or_default());
            Ok(())
        });
        engine.register_task("Clean").unwrap().does(|_| Ok(()));
        engine
            .register_task("Build")
            .unwrap()
            .is_dependent_on("Clean")
            .does(|_| Ok(()));

        let mut ctx = Context::new();
        engine.run_target("Build", &DefaultStrategy, &mut ctx).unwrap();
        assert_eq!(entries(&journal), vec!["Clean", "Build"]);
        assert!(ctx.current_task.is_none());
    }

    #[test]
    fn test_dry_run_records_setup_and_teardown_without_running_them() {
        let journal: Journal = Rc::default();
        let mut engine = Engine::new();
        engine.register_setup(log(&journal, "setup"));
        engine.register_teardown(log(&journal, "teardown"));
        engine.register_task("Build").unwrap().does(log(&journal, "build"));

        let report = engine
            .run_target("Build", &DryRunStrategy, &mut Context::new())
            .unwrap();
        assert!(entries(&journal).is_empty());
        assert!(report.iter().all(|e| e.status == TaskStatus::DryRun));
        assert_eq!(report.len(), 3);
    }

    #[test]
    fn test_run_selects_strategy_from_settings() {
        let journal: Journal = Rc::default();
        let mut engine = Engine::new();
        engine.register_task("Clean").unwrap().does(log(&journal, "clean"));
        engine
            .register_task("Build")
            .unwrap()
            .is_dependent_on("Clean")
            .does(log(&journal, "build"));

        let mut ctx = Context::new();
        let settings = EngineSettings::new("Build").with_dry_run(true);
        let report = engine.run(&settings, &mut ctx).unwrap();
        assert!(entries(&journal).is_empty());
        assert_eq!(report.len(), 2);

        let settings = EngineSettings::new("Build").with_exclusive(true);
        let report = engine.run(&settings, &mut ctx).unwrap();
        assert_eq!(entries(&journal), vec!["build"]);
        assert_eq!(report.len(), 1);
    }
}
