// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */
//! # synaptor-observability
//!
//! Logging setup shared by Synaptor binaries and test harnesses, with
//! per-crate debug flag support.
//!
//! ## Features
//! - `file-logging`: additionally write JSON logs to a file

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

// Re-export commonly used items
pub use cli::*;
pub use config::*;
pub use init::*;

/// Known Synaptor crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "synaptor",
    "synaptor-npu-neural",
    "synaptor-npu-plasticity",
    "synaptor-npu-projection",
    "synaptor-config",
];
