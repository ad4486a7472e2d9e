//! Shell command actions
//!
//! Commands declared in a build file are run through the context's
//! interpreter (`sh -c` by default).

use crate::error::{CommandError, CommandResult};
use crate::runner::{interpolate, Context, Verbosity};
use std::process::{Command as StdCommand, ExitStatus, Stdio};
use tracing::debug;

/// A command declared in a build file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Simple command string
    Simple(String),

    /// Complex command with options
    Complex {
        exec: String,
        print: String,
        quiet: bool,
        dir: Option<String>,
    },
}

impl ShellCommand {
    /// Get the command to execute
    pub fn exec(&self) -> &str {
        match self {
            ShellCommand::Simple(cmd) => cmd,
            ShellCommand::Complex { exec, .. } => exec,
        }
    }

    /// Get what to print
    pub fn print(&self) -> &str {
        match self {
            ShellCommand::Simple(cmd) => cmd,
            ShellCommand::Complex { print, .. } => print,
        }
    }

    pub fn is_quiet(&self) -> bool {
        match self {
            ShellCommand::Simple(_) => false,
            ShellCommand::Complex { quiet, .. } => *quiet,
        }
    }

    /// Get the working directory
    pub fn dir(&self) -> Option<&str> {
        match self {
            ShellCommand::Simple(_) => None,
            ShellCommand::Complex { dir, .. } => dir.as_deref(),
        }
    }
}

/// Execute a command in the given context
pub fn execute_command(cmd: &ShellCommand, ctx: &Context) -> CommandResult<()> {
    let vars = ctx.variables();
    let exec_str = interpolate(cmd.exec(), &vars)?;

    if !cmd.is_quiet() && ctx.verbosity >= Verbosity::Normal {
        let print_str = interpolate(cmd.print(), &vars).unwrap_or_else(|_| cmd.print().to_string());
        eprintln!("[RUN] {}", print_str);
    }

    let working_dir = match cmd.dir() {
        Some(dir) => ctx.working_dir.join(interpolate(dir, &vars)?),
        None => ctx.working_dir.clone(),
    };

    let mut command = shell(ctx, &exec_str)?;
    command.current_dir(&working_dir);
    command.stdin(Stdio::inherit());
    if ctx.verbosity == Verbosity::Silent {
        command.stdout(Stdio::null());
    } else {
        command.stdout(Stdio::inherit());
    }
    command.stderr(Stdio::inherit());

    // Expose run variables to the child process
    for (key, value) in &vars {
        command.env(key, value);
    }

    debug!(command = %exec_str, dir = %working_dir.display(), "spawning command");
    let status = wait(&mut command)?;
    if !status.success() {
        return Err(CommandError::Failed(status.code()));
    }

    Ok(())
}

/// Check if a command succeeds (for when conditions)
pub fn check_command(cmd_str: &str, ctx: &Context) -> CommandResult<bool> {
    let exec_str = interpolate(cmd_str, &ctx.variables())?;

    let mut command = shell(ctx, &exec_str)?;
    command.current_dir(&ctx.working_dir);
    command.stdout(Stdio::null());
    command.stderr(Stdio::null());

    let status = wait(&mut command)?;
    Ok(status.success())
}

fn shell(ctx: &Context, exec_str: &str) -> CommandResult<StdCommand> {
    let (program, args) = ctx
        .interpreter
        .split_first()
        .ok_or(CommandError::NoInterpreter)?;

    let mut command = StdCommand::new(program);
    command.args(args);
    command.arg(exec_str);
    Ok(command)
}

fn wait(command: &mut StdCommand) -> CommandResult<ExitStatus> {
    command.status().map_err(|error| CommandError::Spawn {
        program: command.get_program().to_string_lossy().into_owned(),
        error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_execute_simple_command() {
        let ctx = Context::new();
        let cmd = ShellCommand::Simple("echo test".to_string());
        assert!(execute_command(&cmd, &ctx).is_ok());
    }

    #[test]
    fn test_execute_failing_command() {
        let ctx = Context::new();
        let cmd = ShellCommand::Simple("exit 3".to_string());

        let result = execute_command(&cmd, &ctx);
        assert!(matches!(result, Err(CommandError::Failed(Some(3)))));
    }

    #[test]
    fn test_command_sees_arguments_as_environment() {
        let mut arguments = HashMap::new();
        arguments.insert("configuration".to_string(), "Release".to_string());
        let ctx = Context::new().with_arguments(arguments);

        let cmd = ShellCommand::Simple("test \"$configuration\" = Release".to_string());
        assert!(execute_command(&cmd, &ctx).is_ok());
    }

    #[test]
    fn test_command_runs_in_relative_dir() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("out")).unwrap();

        let ctx = Context::new().with_working_dir(temp_dir.path().to_path_buf());
        let cmd = ShellCommand::Complex {
            exec: "touch marker".to_string(),
            print: "touch".to_string(),
            quiet: true,
            dir: Some("out".to_string()),
        };

        execute_command(&cmd, &ctx).unwrap();
        assert!(temp_dir.path().join("out/marker").exists());
    }

    #[test]
    fn test_missing_interpreter() {
        let ctx = Context::new().with_interpreter(Vec::new());
        let result = check_command("true", &ctx);
        assert!(matches!(result, Err(CommandError::NoInterpreter)));
    }

    #[test]
    fn test_check_command() {
        let ctx = Context::new();
        assert!(check_command("true", &ctx).unwrap());
        assert!(!check_command("false", &ctx).unwrap());
    }

    #[test]
    fn test_check_command_with_variable() {
        let mut vars = HashMap::new();
        vars.insert("cmd".to_string(), "true".to_string());

        let ctx = Context::new().with_vars(vars);
        assert!(check_command("${cmd}", &ctx).unwrap());
    }
}
