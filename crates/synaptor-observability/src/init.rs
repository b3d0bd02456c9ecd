// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */
//! Logging initialization

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::{LogFormat, LoggingConfig};

/// Keeps background log writers alive; drop flushes them
#[derive(Default)]
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

/// Install the global tracing subscriber
///
/// `RUST_LOG`, when set, takes precedence over the debug flags.
///
/// # Errors
///
/// Fails if the filter cannot be parsed, the log directory cannot be
/// created, or a global subscriber is already installed.
pub fn init_logging(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<LoggingGuard> {
    let filter = build_filter(debug_flags, &config.level)?;

    let console = match config.format {
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_target(config.with_target)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed(),
    };

    let mut layers = vec![console.with_filter(filter).boxed()];
    #[allow(unused_mut)]
    let mut guard = LoggingGuard::default();

    #[cfg(feature = "file-logging")]
    if let Some(dir) = &config.log_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
        let appender = tracing_appender::rolling::never(dir, "synaptor.log");
        let (writer, file_guard) = tracing_appender::non_blocking(appender);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .json()
            .with_target(true)
            .with_filter(build_filter(debug_flags, &config.level)?)
            .boxed();
        layers.push(file_layer);
        guard._file_guard = Some(file_guard);
    }

    Registry::default()
        .with(layers)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    tracing::debug!(
        target: "synaptor_observability",
        "Logging initialized at level {} ({:?})",
        config.level,
        config.format
    );

    Ok(guard)
}

/// Filter from `RUST_LOG` if set, otherwise from the debug flags
pub fn build_filter(debug_flags: &CrateDebugFlags, default_level: &str) -> Result<EnvFilter> {
    if let Ok(directives) = std::env::var("RUST_LOG") {
        return EnvFilter::try_new(&directives)
            .with_context(|| format!("Invalid RUST_LOG directives: {}", directives));
    }
    let directives = debug_flags.to_filter_string(default_level);
    EnvFilter::try_new(&directives)
        .with_context(|| format!("Invalid log filter: {}", directives))
}

/// Initialize console logging at `info` with flags from the environment
pub fn init_default_logging() -> Result<LoggingGuard> {
    init_logging(&crate::cli::parse_debug_flags(), &LoggingConfig::default())
}
