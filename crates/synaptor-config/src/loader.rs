// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */
//! Configuration file loading with override support
//!
//! Three tiers, later ones winning:
//! 1. TOML file (base values)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, StructuralVariant, SynaptorConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use synaptor_npu_neural::SynapseType;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "synaptor.toml";

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "SYNAPTOR_CONFIG_PATH";

/// Find the configuration file
///
/// Search order:
/// 1. `SYNAPTOR_CONFIG_PATH` environment variable
/// 2. Current working directory: `./synaptor.toml`
/// 3. Parent directories, up to 5 levels
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by {} not found: {}",
            CONFIG_PATH_ENV,
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

    if let Some(path) = search_paths.iter().find(|p| p.exists()) {
        return Ok(path.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet {} to specify a custom location.",
        CONFIG_FILE_NAME, search_list, CONFIG_PATH_ENV
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if the file is not found or contains invalid TOML.
/// Validation is a separate step, see [`crate::validate_config`].
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<SynaptorConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: SynaptorConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);

    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

fn parse_bool(value: &str) -> bool {
    let v = value.to_lowercase();
    v == "true" || v == "1" || v == "yes"
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `SYNAPTOR_SEED` -> `system.seed`
/// - `SYNAPTOR_LOG_LEVEL` -> `logging.level`
/// - `SYNAPTOR_LRATE` -> `projection.learn.lrate`
/// - `SYNAPTOR_DELAY` -> `projection.com.delay`
pub fn apply_environment_overrides(config: &mut SynaptorConfig) {
    if let Ok(value) = env::var("SYNAPTOR_SEED") {
        if let Ok(seed) = value.parse::<u64>() {
            config.system.seed = seed;
        }
    }
    if let Ok(value) = env::var("SYNAPTOR_LOG_LEVEL") {
        config.logging.level = value;
    }
    if let Ok(value) = env::var("SYNAPTOR_LRATE") {
        if let Ok(lrate) = value.parse::<f32>() {
            config.projection.learn.lrate = lrate;
        }
    }
    if let Ok(value) = env::var("SYNAPTOR_DELAY") {
        if let Ok(delay) = value.parse::<usize>() {
            config.projection.com.delay = delay;
        }
    }
}

/// Apply CLI argument overrides to configuration
///
/// Keys are dotted paths relative to the root (`system.seed`,
/// `logging.level`) or to the projection section (`learn.lrate`,
/// `com.delay`, `swt.adapt.on`). Unknown keys and unparsable values are
/// ignored.
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - HashMap of CLI arguments (e.g., `{"learn.lrate": "0.02"}`)
pub fn apply_cli_overrides(config: &mut SynaptorConfig, cli_args: &HashMap<String, String>) {
    for (key, value) in cli_args {
        let key = key.strip_prefix("projection.").unwrap_or(key);
        let p = &mut config.projection;
        match key {
            "system.seed" => set_parsed(&mut config.system.seed, value),
            "system.threads" => set_parsed(&mut config.system.threads, value),
            "logging.level" => config.logging.level = value.clone(),
            "logging.format" => config.logging.format = value.clone(),
            "variant" => match value.as_str() {
                "fixed_scale" => p.variant = StructuralVariant::FixedScale,
                "adaptive_swt" => p.variant = StructuralVariant::AdaptiveSwt,
                _ => {}
            },
            "polarity" => match value.as_str() {
                "excitatory" => p.polarity = SynapseType::Excitatory,
                "inhibitory" => p.polarity = SynapseType::Inhibitory,
                _ => {}
            },
            "com.delay" => set_parsed(&mut p.com.delay, value),
            "com.p_fail" => set_parsed(&mut p.com.p_fail, value),
            "com.p_fail_swt" => p.com.p_fail_swt = parse_bool(value),
            "scale.rel" => set_parsed(&mut p.scale.rel, value),
            "scale.abs" => set_parsed(&mut p.scale.abs, value),
            "scale.adapt" => p.scale.adapt = parse_bool(value),
            "swt.init.mean" => set_parsed(&mut p.swt.init.mean, value),
            "swt.init.var" => set_parsed(&mut p.swt.init.var, value),
            "swt.init.sym" => p.swt.init.sym = parse_bool(value),
            "swt.adapt.on" => p.swt.adapt.on = parse_bool(value),
            "swt.adapt.lrate" => set_parsed(&mut p.swt.adapt.lrate, value),
            "swt.adapt.sub_norm" => p.swt.adapt.sub_norm = parse_bool(value),
            "learn.learn" => p.learn.learn = parse_bool(value),
            "learn.lrate" => set_parsed(&mut p.learn.lrate, value),
            "learn.xcal.d_rev" => set_parsed(&mut p.learn.xcal.d_rev, value),
            "learn.xcal.lrn_thr" => set_parsed(&mut p.learn.xcal.lrn_thr, value),
            "learn.xcal.sub_mean" => set_parsed(&mut p.learn.xcal.sub_mean, value),
            "learn.wt_bal.on" => p.learn.wt_bal.on = parse_bool(value),
            _ => {}
        }
    }
}

fn set_parsed<T: std::str::FromStr>(slot: &mut T, value: &str) {
    if let Ok(v) = value.parse::<T>() {
        *slot = v;
    }
}
