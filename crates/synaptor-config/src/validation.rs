// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */
//! Configuration validation
//!
//! Checks that parameter values are within the ranges the learning rules
//! and transforms are defined on.

use crate::{ConfigError, ConfigResult, SynaptorConfig};

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    InvalidValue { field: String, reason: String },
    InvalidRange { field: String, min: f32, max: f32 },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
            Self::InvalidRange { field, min, max } => {
                write!(f, "Invalid range for {}: min {} exceeds max {}", field, min, max)
            }
        }
    }
}

/// Validate the complete configuration
///
/// All violations are collected before returning.
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every violation
pub fn validate_config(config: &SynaptorConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_logging(config, &mut errors);
    validate_projection(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn invalid(errors: &mut Vec<ConfigValidationError>, field: &str, reason: impl Into<String>) {
    errors.push(ConfigValidationError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    });
}

fn check_unit(errors: &mut Vec<ConfigValidationError>, field: &str, v: f32) {
    if !(0.0..=1.0).contains(&v) {
        invalid(errors, field, format!("{} must be between 0 and 1", v));
    }
}

fn validate_logging(config: &SynaptorConfig, errors: &mut Vec<ConfigValidationError>) {
    const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
    if !LEVELS.contains(&config.logging.level.to_lowercase().as_str()) {
        invalid(
            errors,
            "logging.level",
            format!("must be one of {:?}, got {}", LEVELS, config.logging.level),
        );
    }
    if !matches!(config.logging.format.as_str(), "text" | "json") {
        invalid(
            errors,
            "logging.format",
            format!("must be text or json, got {}", config.logging.format),
        );
    }
}

fn validate_projection(config: &SynaptorConfig, errors: &mut Vec<ConfigValidationError>) {
    let p = &config.projection;

    check_unit(errors, "com.p_fail", p.com.p_fail);

    if p.scale.rel < 0.0 {
        invalid(errors, "scale.rel", "must not be negative");
    }
    if p.scale.abs < 0.0 {
        invalid(errors, "scale.abs", "must not be negative");
    }
    if p.scale.lo_tol < 0.0 {
        invalid(errors, "scale.lo_tol", "must not be negative");
    }
    if p.scale.hi_tol < 0.0 {
        invalid(errors, "scale.hi_tol", "must not be negative");
    }
    if p.scale.avg_tau <= 0.0 {
        invalid(errors, "scale.avg_tau", "must be positive");
    }

    let lim = &p.swt.limit;
    if lim.swt.min > lim.swt.max {
        errors.push(ConfigValidationError::InvalidRange {
            field: "swt.limit.swt".to_string(),
            min: lim.swt.min,
            max: lim.swt.max,
        });
    }
    if lim.mean.min > lim.mean.max {
        errors.push(ConfigValidationError::InvalidRange {
            field: "swt.limit.mean".to_string(),
            min: lim.mean.min,
            max: lim.mean.max,
        });
    }
    check_unit(errors, "swt.limit.swt.min", lim.swt.min);
    check_unit(errors, "swt.limit.swt.max", lim.swt.max);
    check_unit(errors, "swt.init.s_pct", p.swt.init.s_pct);
    if p.swt.init.var < 0.0 {
        invalid(errors, "swt.init.var", "must not be negative");
    }
    if p.swt.adapt.sig_gain <= 0.0 {
        invalid(errors, "swt.adapt.sig_gain", "must be positive");
    }
    check_unit(errors, "swt.adapt.lrate", p.swt.adapt.lrate);

    let l = &p.learn;
    if l.lrate < 0.0 {
        invalid(errors, "learn.lrate", "must not be negative");
    }
    if !(0.0..=0.99).contains(&l.xcal.d_rev) {
        invalid(
            errors,
            "learn.xcal.d_rev",
            format!("{} must be between 0 and 0.99", l.xcal.d_rev),
        );
    }
    check_unit(errors, "learn.xcal.sub_mean", l.xcal.sub_mean);
    if l.wt_sig.gain <= 0.0 {
        invalid(errors, "learn.wt_sig.gain", "must be positive");
    }
    if l.wt_sig.off <= 0.0 {
        invalid(errors, "learn.wt_sig.off", "must be positive");
    }
}
