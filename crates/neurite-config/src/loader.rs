// Copyright 2025 Neurite Developers
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Loading happens in three tiers:
//! 1. TOML file (base values, defaults for anything missing)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)
//!
//! The merged result is validated before it is returned.

use crate::{validate_config, BoundaryConditions, ConfigError, ConfigResult, NeuriteConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const CONFIG_FILE_NAME: &str = "neurite_configuration.toml";

/// Find the neurite configuration file
///
/// Search order:
/// 1. `NEURITE_CONFIG_PATH` environment variable
/// 2. Current working directory
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("NEURITE_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by NEURITE_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    if let Some(found) = search_paths.iter().find(|p| p.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet NEURITE_CONFIG_PATH to specify a custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Returns
///
/// Complete, unit-normalised `NeuriteConfig` with all overrides applied
///
/// # Errors
///
/// Returns error if config file is not found, contains invalid TOML, or fails validation
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<NeuriteConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: NeuriteConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config)?;
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli)?;
    }

    validate_config(&config)?;
    Ok(config.normalized())
}

fn parse_boundaries(source: &str, value: &str) -> ConfigResult<BoundaryConditions> {
    match value.to_lowercase().as_str() {
        "periodic" => Ok(BoundaryConditions::Periodic),
        "clamped" | "reflective" => Ok(BoundaryConditions::Clamped),
        _ => Err(ConfigError::InvalidValue(format!(
            "{} = '{}': expected periodic or clamped",
            source, value
        ))),
    }
}

fn parse_number<T: FromStr>(source: &str, value: &str) -> ConfigResult<T> {
    value.trim().parse::<T>().map_err(|_| {
        ConfigError::InvalidValue(format!(
            "{} = '{}': expected a non-negative integer",
            source, value
        ))
    })
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `NEURITE_SEED` -> `system.seed`
/// - `NEURITE_LOG_LEVEL` -> `system.log_level`
/// - `NEURITE_NEURONS` -> `culture.neurons`
/// - `NEURITE_BOUNDARIES` -> `chamber.boundaries`
/// - `NEURITE_OUTPUT_DIR` -> `output.directory`
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` for a value that does not parse.
pub fn apply_environment_overrides(config: &mut NeuriteConfig) -> ConfigResult<()> {
    if let Ok(value) = env::var("NEURITE_SEED") {
        config.system.seed = Some(parse_number("NEURITE_SEED", &value)?);
    }
    if let Ok(value) = env::var("NEURITE_LOG_LEVEL") {
        config.system.log_level = value;
    }
    if let Ok(value) = env::var("NEURITE_NEURONS") {
        config.culture.neurons = parse_number("NEURITE_NEURONS", &value)?;
    }
    if let Ok(value) = env::var("NEURITE_BOUNDARIES") {
        config.chamber.boundaries = parse_boundaries("NEURITE_BOUNDARIES", &value)?;
    }
    if let Ok(value) = env::var("NEURITE_OUTPUT_DIR") {
        config.output.directory = PathBuf::from(value);
    }
    Ok(())
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - HashMap of CLI arguments (e.g., `{"seed": "42", "neurons": "2000"}`)
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` for a value that does not parse.
pub fn apply_cli_overrides(
    config: &mut NeuriteConfig,
    cli_args: &HashMap<String, String>,
) -> ConfigResult<()> {
    if let Some(value) = cli_args.get("seed") {
        config.system.seed = Some(parse_number("seed", value)?);
    }
    if let Some(value) = cli_args.get("log_level") {
        config.system.log_level = value.clone();
    }
    if let Some(value) = cli_args.get("neurons") {
        config.culture.neurons = parse_number("neurons", value)?;
    }
    if let Some(value) = cli_args.get("boundaries") {
        config.chamber.boundaries = parse_boundaries("boundaries", value)?;
    }
    if let Some(value) = cli_args.get("output_dir") {
        config.output.directory = PathBuf::from(value);
    }
    Ok(())
}
