//! Build file to engine
//!
//! Registers every task of a build file, in file order, and turns its
//! commands into actions, handlers and hooks.

use crate::config::schema::convert_when;
use crate::config::types::{Command, CommandDetail, Config};
use crate::error::Result;
use crate::runner::{execute_command, Context, Engine, ShellCommand};

/// Variable holding the failure message while error commands run
pub const ERROR_VAR: &str = "BAKE_ERROR";

/// Target used when neither the command line nor the build file names one
pub const DEFAULT_TARGET: &str = "default";

impl From<Command> for ShellCommand {
    fn from(command: Command) -> Self {
        match command {
            Command::Simple(cmd) => ShellCommand::Simple(cmd),
            Command::Complex(CommandDetail { exec, print, quiet, dir }) => ShellCommand::Complex {
                print: print.unwrap_or_else(|| exec.clone()),
                exec,
                quiet,
                dir,
            },
        }
    }
}

/// Populate an engine from a parsed build file
pub fn build_engine(config: &Config) -> Result<Engine> {
    let mut engine = Engine::new();

    if let Some(action) = commands_action(&config.setup) {
        engine.register_setup(action);
    }
    if let Some(action) = commands_action(&config.teardown) {
        engine.register_teardown(action);
    }
    if let Some(action) = commands_action(&config.task_setup) {
        engine.register_task_setup(action);
    }
    if let Some(action) = commands_action(&config.task_teardown) {
        engine.register_task_teardown(action);
    }

    for (name, task) in &config.tasks {
        let mut builder = engine.register_task(name.as_str())?;

        if let Some(description) = &task.description {
            builder = builder.description(description.as_str());
        }
        for dependency in &task.depends {
            builder = builder.is_dependent_on(dependency.as_str());
        }
        for dependee in &task.before {
            builder = builder.is_dependee_of(dependee.as_str());
        }
        for when in &task.when {
            builder = builder.with_criterion(convert_when(name, when)?.into_criterion());
        }
        if task.continue_on_error {
            builder = builder.continue_on_error();
        }
        if task.defer_on_error {
            builder = builder.defer_on_error();
        }
        for command in &task.run {
            let command = ShellCommand::from(command.clone());
            builder = builder.does(move |ctx| Ok(execute_command(&command, ctx)?));
        }
        if let Some(action) = commands_action(&task.setup) {
            builder = builder.setup(action);
        }
        if let Some(handler) = error_commands(&task.report_error) {
            builder = builder.report_error(handler);
        }
        if let Some(handler) = error_commands(&task.on_error) {
            builder = builder.on_error(handler);
        }
        if let Some(action) = commands_action(&task.finally) {
            builder = builder.finally(action);
        }
        if let Some(action) = commands_action(&task.teardown) {
            builder.teardown(action);
        }
    }

    Ok(engine)
}

/// Target to run: explicit, then the build file's default
pub fn default_target(config: &Config, requested: Option<&str>) -> String {
    requested
        .map(str::to_string)
        .or_else(|| config.default.clone())
        .unwrap_or_else(|| DEFAULT_TARGET.to_string())
}

fn commands_action(commands: &[Command]) -> Option<impl Fn(&mut Context) -> anyhow::Result<()> + 'static> {
    if commands.is_empty() {
        return None;
    }
    let commands: Vec<ShellCommand> = commands.iter().cloned().map(ShellCommand::from).collect();
    Some(move |ctx: &mut Context| {
        for command in &commands {
            execute_command(command, ctx)?;
        }
        Ok(())
    })
}

/// Run commands with the failure message exposed as `${BAKE_ERROR}`
fn error_commands(
    commands: &[Command],
) -> Option<impl Fn(&anyhow::Error, &mut Context) -> anyhow::Result<()> + 'static> {
    let action = commands_action(commands)?;
    Some(move |error: &anyhow::Error, ctx: &mut Context| {
        ctx.set_var(ERROR_VAR, format!("{error:#}"));
        let result = action(ctx);
        ctx.vars.remove(ERROR_VAR);
        result
    })
}
