//! Main CLI application

use crate::config::{build_engine, default_target, find_config_file, load_env_file, parse_config_file, validate_config};
use crate::error::{ConfigError, Result};
use crate::logging::init_logging;
use crate::runner::{Context, EngineSettings, Verbosity};
use crate::ui::{print_report, render_task_list};
use clap::{Arg, ArgAction, ArgMatches, Command};
use clap_complete::Shell;
use std::collections::HashMap;
use std::env;
use std::io;
use std::path::{Path, PathBuf};

/// Build the clap command
pub fn build_command() -> Command {
    Command::new("bake")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Run build tasks in dependency order")
        .arg(
            Arg::new("target")
                .value_name("TARGET")
                .help("Task to run, together with everything it depends on"),
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Path to bake.yml build file"),
        )
        .arg(
            Arg::new("arg")
                .short('a')
                .long("arg")
                .value_name("KEY=VALUE")
                .value_parser(parse_arg)
                .action(ArgAction::Append)
                .help("Argument visible to tasks as ${KEY}"),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .action(ArgAction::SetTrue)
                .help("Show what would run without running anything"),
        )
        .arg(
            Arg::new("exclusive")
                .long("exclusive")
                .action(ArgAction::SetTrue)
                .help("Run only the target, ignoring its dependencies"),
        )
        .arg(
            Arg::new("list")
                .short('l')
                .long("list")
                .action(ArgAction::SetTrue)
                .help("List the tasks of the build file"),
        )
        .arg(
            Arg::new("completions")
                .long("completions")
                .value_name("SHELL")
                .value_parser(clap::value_parser!(Shell))
                .help("Print a shell completion script"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print command output and errors")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Print no output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (off, error, warn, info, debug, trace)"),
        )
}

/// Run the CLI application with the process arguments
pub fn run() -> Result<()> {
    run_with(build_command().get_matches())
}

/// Run the CLI application with parsed matches
pub fn run_with(matches: ArgMatches) -> Result<()> {
    if let Some(shell) = matches.get_one::<Shell>("completions").copied() {
        clap_complete::generate(shell, &mut build_command(), "bake", &mut io::stdout());
        return Ok(());
    }

    let verbosity = get_verbosity(&matches);
    init_logging(matches.get_one::<String>("log-level").map(String::as_str), verbosity);

    let config_path = match matches.get_one::<PathBuf>("file") {
        Some(path) => resolve_file(path)?,
        None => find_config_file()?,
    };
    tracing::debug!(path = %config_path.display(), "Loading build file");

    let config = parse_config_file(&config_path)?;
    validate_config(&config)?;
    let base_dir = match config_path.parent() {
        Some(dir) => dir.to_path_buf(),
        None => env::current_dir()?,
    };
    load_env_file(&config, &base_dir)?;

    let engine = build_engine(&config)?;

    if matches.get_flag("list") {
        print!("{}", render_task_list(engine.registry()));
        return Ok(());
    }

    let arguments: HashMap<String, String> = matches
        .get_many::<(String, String)>("arg")
        .into_iter()
        .flatten()
        .cloned()
        .collect();

    let mut ctx = Context::new()
        .with_config_path(config_path)
        .with_working_dir(base_dir)
        .with_arguments(arguments)
        .with_verbosity(verbosity);
    if let Some(interpreter) = &config.interpreter {
        ctx = ctx.with_interpreter(interpreter.clone());
    }

    let target = default_target(&config, matches.get_one::<String>("target").map(String::as_str));
    let settings = EngineSettings::new(target)
        .with_dry_run(matches.get_flag("dry-run"))
        .with_exclusive(matches.get_flag("exclusive"));

    let report = engine.run(&settings, &mut ctx)?;
    if verbosity > Verbosity::Silent {
        print_report(&report);
    }
    Ok(())
}

fn resolve_file(path: &Path) -> Result<PathBuf> {
    if !path.is_file() {
        return Err(ConfigError::NotFound(path.display().to_string()).into());
    }
    Ok(path.canonicalize()?)
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("silent") {
        Verbosity::Silent
    } else if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

/// Split a `KEY=VALUE` argument
fn parse_arg(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}
