// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */
//! # Synaptor - spiking network projection engine
//!
//! Synaptor simulates the synaptic connections ("projections") between two
//! populations of a spiking network: delayed conductance transmission, the
//! XCAL error-driven learning rule, and the slow homeostatic processes that
//! keep learned weights within range.
//!
//! Neuron dynamics are not part of this crate. A layer only has to expose
//! the [`PrjnLayer`](neural::PrjnLayer) contract: per-unit activation traces
//! to read and conductance accumulators to write.
//!
//! ## Usage
//!
//! ```rust
//! use synaptor::prelude::*;
//!
//! let input = Layer::new("Input", 16);
//! let mut hidden = Layer::new("Hidden", 8);
//! let mut prjn = Projection::build(&input, &hidden, &Full::default(), ProjectionConfig::default(), 42)?;
//! prjn.init_gscale(input.avg_act(), 1.0);
//!
//! // one cycle: input unit 3 spikes, then the delay line delivers
//! prjn.send_spike(3)?;
//! prjn.recv_g_inc(Phase::Minus, &mut hidden)?;
//!
//! // end of trial
//! prjn.dwt(&input, &hidden)?;
//! prjn.dwt_sub_mean(&hidden)?;
//! prjn.wt_fm_dwt();
//! # Ok::<(), synaptor::neural::PrjnError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  synaptor-npu-neural                                    │
//! │  (Synapse, WtSigParams, GScaleVals, PrjnLayer, errors)  │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  synaptor-npu-plasticity                                │
//! │  (XCAL, SWt rescaling, weight balance, activity traces) │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  synaptor-npu-projection                                │
//! │  (ConnectivityTable, DelayLine, Projection, weights)    │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Configuration (`synaptor-config`) and logging (`synaptor-observability`)
//! sit beside the NPU crates.

pub use synaptor_config as config;
pub use synaptor_npu_neural as neural;
pub use synaptor_npu_plasticity as plasticity;
pub use synaptor_npu_projection as projection;
pub use synaptor_observability as observability;

use synaptor_config::SynaptorConfig;
use synaptor_observability::{CrateDebugFlags, LogFormat, LoggingGuard};

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::config::{ProjectionConfig, StructuralVariant, SynaptorConfig};
    pub use crate::neural::{Layer, Neuron, Phase, PrjnError, PrjnLayer, Synapse, SynapseType};
    pub use crate::plasticity::{AvgLParams, LrnActAvgParams};
    pub use crate::projection::{
        init_gscales, update_avg_max_rel, ConnectivityPattern, ExplicitPattern, Full, OneToOne,
        PrjnWeights, Projection, UniformRandom,
    };
}

/// Observability settings derived from the configuration file
///
/// Debug crates listed in the file are merged with `extra` (typically
/// parsed from `--debug-*` arguments).
pub fn logging_settings(
    config: &SynaptorConfig,
    extra: &CrateDebugFlags,
) -> (CrateDebugFlags, synaptor_observability::LoggingConfig) {
    let mut flags = CrateDebugFlags::from_names(config.logging.debug_crates.iter());
    for (name, &on) in &extra.enabled_crates {
        if on {
            flags.enable(name);
        }
    }
    let logging = synaptor_observability::LoggingConfig {
        level: config.logging.level.clone(),
        format: LogFormat::from_name(&config.logging.format),
        ..Default::default()
    };
    (flags, logging)
}

/// Install the global tracing subscriber as configured
pub fn init_logging(config: &SynaptorConfig, extra: &CrateDebugFlags) -> anyhow::Result<LoggingGuard> {
    let (flags, logging) = logging_settings(config, extra);
    let guard = synaptor_observability::init_logging(&flags, &logging)?;
    tracing::info!(
        target: "synaptor",
        "Synaptor {} logging at {} ({:?})", VERSION, logging.level, logging.format
    );
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_settings_merge_flags() {
        let mut config = SynaptorConfig::default();
        config.logging.format = "json".to_string();
        config.logging.debug_crates = vec!["synaptor-config".to_string()];
        let extra = CrateDebugFlags::from_args(vec!["--debug-synaptor-npu-projection".to_string()]);

        let (flags, logging) = logging_settings(&config, &extra);
        assert!(flags.is_enabled("synaptor-config"));
        assert!(flags.is_enabled("synaptor-npu-projection"));
        assert!(!flags.is_enabled("synaptor-npu-neural"));
        assert_eq!(logging.format, LogFormat::Json);
        assert_eq!(logging.level, "info");
    }
}
