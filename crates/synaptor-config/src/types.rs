// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */
//! Configuration type definitions
//!
//! Every section derives `Default` and uses `#[serde(default)]`, so a
//! configuration file only needs to name the values it changes.

use serde::{Deserialize, Serialize};
use synaptor_npu_neural::{PrjnScaleParams, SynComParams, SynapseType};
use synaptor_npu_plasticity::{LearnSynParams, SWtParams};

/// Root configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SynaptorConfig {
    pub system: SystemConfig,
    pub logging: LoggingConfig,
    pub projection: ProjectionConfig,
}

/// Process-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Seed for weight initialization and transmission failure
    pub seed: u64,
    /// Worker threads for the learning passes; 0 uses the rayon default
    pub threads: usize,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self { seed: 42, threads: 0 }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level: trace, debug, info, warn, error
    pub level: String,
    /// Output format: text or json
    pub format: String,
    /// Crates with debug logging enabled, e.g. `["synaptor-npu-projection"]`
    pub debug_crates: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
            debug_crates: Vec::new(),
        }
    }
}

/// How a projection separates the slow and fast weight components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuralVariant {
    /// Per-synapse fixed scale with weight balance
    FixedScale,
    /// Per-synapse adaptive structural weight with mean rescaling
    #[default]
    AdaptiveSwt,
}

/// Parameters of a single projection
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub variant: StructuralVariant,
    pub polarity: SynapseType,
    pub com: SynComParams,
    pub scale: PrjnScaleParams,
    pub swt: SWtParams,
    pub learn: LearnSynParams,
}
