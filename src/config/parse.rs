//! Build file parsing and discovery

use crate::config::types::{Config, Task};
use crate::error::{ConfigError, ConfigResult, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default build file names to search for
pub const CONFIG_FILE_NAMES: &[&str] = &["bake.yml", "bake.yaml"];

/// Find the build file by searching current and parent directories
pub fn find_config_file() -> ConfigResult<PathBuf> {
    find_config_file_from(env::current_dir().map_err(|e| {
        ConfigError::Invalid(format!("Failed to get current directory: {}", e))
    })?)
}

/// Find the build file starting from a specific directory
pub fn find_config_file_from(start_dir: PathBuf) -> ConfigResult<PathBuf> {
    let mut current_dir = start_dir;
    let mut searched_paths = Vec::new();

    loop {
        for file_name in CONFIG_FILE_NAMES {
            let config_path = current_dir.join(file_name);
            searched_paths.push(config_path.display().to_string());

            if config_path.is_file() {
                return Ok(config_path);
            }
        }

        // Try parent directory
        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => return Err(ConfigError::NotFound(searched_paths.join(", "))),
        }
    }
}

/// Parse a build file from a path
pub fn parse_config_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("Failed to read file '{}': {}", path.display(), e)))?;

    parse_config(&contents, Some(path))
}

/// Parse a build file from a string
pub fn parse_config(yaml: &str, config_path: Option<&Path>) -> Result<Config> {
    let mut config: Config = serde_yaml::from_str(yaml)?;

    // Process includes if present
    if let Some(base_path) = config_path {
        process_includes(&mut config, base_path)?;
    }

    Ok(config)
}

/// Replace tasks that carry an `include` with the included definition
fn process_includes(config: &mut Config, config_path: &Path) -> Result<()> {
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    for task in config.tasks.values_mut() {
        if let Some(include_path) = &task.include {
            *task = load_included_task(&base_dir.join(include_path))?;
        }
    }

    Ok(())
}

/// Load a task from an included file
fn load_included_task(path: &Path) -> ConfigResult<Task> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::IncludeFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    serde_yaml::from_str(&contents).map_err(|e| ConfigError::IncludeFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Parse a build file with automatic discovery
pub fn parse_config_auto() -> Result<(Config, PathBuf)> {
    let config_path = find_config_file()?;
    let config = parse_config_file(&config_path)?;
    Ok((config, config_path))
}

/// Load the `env-file` of a build file into the process environment
pub fn load_env_file(config: &Config, base_dir: &Path) -> ConfigResult<Option<PathBuf>> {
    let Some(env_file) = &config.env_file else {
        return Ok(None);
    };

    let path = base_dir.join(env_file);
    dotenvy::from_path(&path).map_err(|e| ConfigError::EnvFile {
        path: path.clone(),
        error: e.to_string(),
    })?;
    Ok(Some(path))
}
