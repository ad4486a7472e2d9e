//! Execution strategies
//!
//! The engine decides *when* something runs; a strategy decides *how*. The
//! default strategy invokes user code, the dry-run strategy only records
//! what would have happened.

use crate::report::TaskStatus;
use crate::runner::Context;
use crate::task::{Action, ErrorHandler, Task};
use tracing::{debug, info, warn};

/// How setup, tasks, handlers and teardown are performed
pub trait ExecutionStrategy {
    /// Status recorded for a task that ran to completion
    fn completed_status(&self) -> TaskStatus;

    /// Returns the skip reason of the first failing criterion
    fn evaluate_criteria(&self, task: &Task, ctx: &Context) -> anyhow::Result<Option<String>>;

    fn perform_setup(&self, action: &Action, ctx: &mut Context) -> anyhow::Result<()>;

    fn perform_teardown(&self, action: &Action, ctx: &mut Context) -> anyhow::Result<()>;

    fn perform_task_setup(&self, task: &Task, action: &Action, ctx: &mut Context) -> anyhow::Result<()>;

    fn perform_task_teardown(&self, task: &Task, action: &Action, ctx: &mut Context) -> anyhow::Result<()>;

    /// Run the task's actions
    fn execute(&self, task: &Task, ctx: &mut Context) -> anyhow::Result<()>;

    fn report_errors(
        &self,
        task: &Task,
        reporter: &ErrorHandler,
        error: &anyhow::Error,
        ctx: &mut Context,
    ) -> anyhow::Result<()>;

    fn handle_errors(
        &self,
        task: &Task,
        handler: &ErrorHandler,
        error: &anyhow::Error,
        ctx: &mut Context,
    ) -> anyhow::Result<()>;

    fn invoke_finally(&self, task: &Task, action: &Action, ctx: &mut Context) -> anyhow::Result<()>;
}

/// Pick the strategy for a run
pub fn strategy_for(dry_run: bool) -> Box<dyn ExecutionStrategy> {
    if dry_run {
        Box::new(DryRunStrategy)
    } else {
        Box::new(DefaultStrategy)
    }
}

/// Runs user code
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStrategy;

impl ExecutionStrategy for DefaultStrategy {
    fn completed_status(&self) -> TaskStatus {
        TaskStatus::Executed
    }

    fn evaluate_criteria(&self, task: &Task, ctx: &Context) -> anyhow::Result<Option<String>> {
        Ok(task
            .failing_criterion(ctx)?
            .map(|criterion| criterion.reason().to_string()))
    }

    fn perform_setup(&self, action: &Action, ctx: &mut Context) -> anyhow::Result<()> {
        info!("Executing custom setup action...");
        action(ctx)
    }

    fn perform_teardown(&self, action: &Action, ctx: &mut Context) -> anyhow::Result<()> {
        info!("Executing custom teardown action...");
        action(ctx)
    }

    fn perform_task_setup(&self, task: &Task, action: &Action, ctx: &mut Context) -> anyhow::Result<()> {
        debug!(task = %task.name, "Executing task setup action");
        action(ctx)
    }

    fn perform_task_teardown(&self, task: &Task, action: &Action, ctx: &mut Context) -> anyhow::Result<()> {
        debug!(task = %task.name, "Executing task teardown action");
        action(ctx)
    }

    fn execute(&self, task: &Task, ctx: &mut Context) -> anyhow::Result<()> {
        if !task.defer_on_error {
            for action in &task.actions {
                action(ctx)?;
            }
            return Ok(());
        }

        let mut failures = Vec::new();
        for action in &task.actions {
            if let Err(e) = action(ctx) {
                warn!(task = %task.name, "Deferred action failure: {e:#}");
                failures.push(e);
            }
        }

        let mut failures = failures.into_iter();
        match failures.next() {
            None => Ok(()),
            Some(first) => match failures.len() {
                0 => Err(first),
                more => Err(first.context(format!("{more} further deferred action(s) also failed"))),
            },
        }
    }

    fn report_errors(
        &self,
        task: &Task,
        reporter: &ErrorHandler,
        error: &anyhow::Error,
        ctx: &mut Context,
    ) -> anyhow::Result<()> {
        debug!(task = %task.name, "Executing error reporter");
        reporter(error, ctx)
    }

    fn handle_errors(
        &self,
        task: &Task,
        handler: &ErrorHandler,
        error: &anyhow::Error,
        ctx: &mut Context,
    ) -> anyhow::Result<()> {
        debug!(task = %task.name, "Executing error handler");
        handler(error, ctx)
    }

    fn invoke_finally(&self, task: &Task, action: &Action, ctx: &mut Context) -> anyhow::Result<()> {
        debug!(task = %task.name, "Executing finally handler");
        action(ctx)
    }
}

/// Simulates a run without touching user code
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunStrategy;

impl ExecutionStrategy for DryRunStrategy {
    fn completed_status(&self) -> TaskStatus {
        TaskStatus::DryRun
    }

    fn evaluate_criteria(&self, _task: &Task, _ctx: &Context) -> anyhow::Result<Option<String>> {
        Ok(None)
    }

    fn perform_setup(&self, _action: &Action, _ctx: &mut Context) -> anyhow::Result<()> {
        info!("Would execute setup");
        Ok(())
    }

    fn perform_teardown(&self, _action: &Action, _ctx: &mut Context) -> anyhow::Result<()> {
        info!("Would execute teardown");
        Ok(())
    }

    fn perform_task_setup(&self, _task: &Task, _action: &Action, _ctx: &mut Context) -> anyhow::Result<()> {
        Ok(())
    }

    fn perform_task_teardown(&self, _task: &Task, _action: &Action, _ctx: &mut Context) -> anyhow::Result<()> {
        Ok(())
    }

    fn execute(&self, task: &Task, _ctx: &mut Context) -> anyhow::Result<()> {
        info!(task = %task.name, "Would execute task");
        Ok(())
    }

    fn report_errors(
        &self,
        _task: &Task,
        _reporter: &ErrorHandler,
        _error: &anyhow::Error,
        _ctx: &mut Context,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    fn handle_errors(
        &self,
        _task: &Task,
        _handler: &ErrorHandler,
        _error: &anyhow::Error,
        _ctx: &mut Context,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    fn invoke_finally(&self, _task: &Task, _action: &Action, _ctx: &mut Context) -> anyhow::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Criterion;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting_task(name: &str, calls: &Rc<Cell<u32>>, outcomes: &[bool]) -> Task {
        let mut task = Task::new(name);
        for &ok in outcomes {
            let calls = Rc::clone(calls);
            task.actions.push(Box::new(move |_| {
                calls.set(calls.get() + 1);
                if ok {
                    Ok(())
                } else {
                    anyhow::bail!("action {} failed", calls.get())
                }
            }));
        }
        task
    }

    #[test]
    fn test_default_stops_at_first_failure() {
        let calls = Rc::new(Cell::new(0));
        let task = counting_task("Build", &calls, &[true, false, true]);

        let result = DefaultStrategy.execute(&task, &mut Context::new());
        assert!(result.is_err());
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_defer_on_error_runs_every_action() {
        let calls = Rc::new(Cell::new(0));
        let mut task = counting_task("Test", &calls, &[false, true, false]);
        task.defer_on_error = true;

        let err = DefaultStrategy.execute(&task, &mut Context::new()).unwrap_err();
        assert_eq!(calls.get(), 3);
        let message = format!("{err:#}");
        assert!(message.contains("1 further deferred action(s) also failed"));
        assert!(message.contains("action 1 failed"));
    }

    #[test]
    fn test_dry_run_never_invokes_actions() {
        let calls = Rc::new(Cell::new(0));
        let mut task = counting_task("Build", &calls, &[true, false]);
        task.criteria.push(Criterion::new(Box::new(|_| Ok(false)), None));

        let strategy = DryRunStrategy;
        let mut ctx = Context::new();
        assert_eq!(strategy.evaluate_criteria(&task, &ctx).unwrap(), None);
        assert!(strategy.execute(&task, &mut ctx).is_ok());
        assert_eq!(calls.get(), 0);
        assert_eq!(strategy.completed_status(), TaskStatus::DryRun);
    }

    #[test]
    fn test_strategy_selection() {
        assert_eq!(strategy_for(true).completed_status(), TaskStatus::DryRun);
        assert_eq!(strategy_for(false).completed_status(), TaskStatus::Executed);
    }
}
