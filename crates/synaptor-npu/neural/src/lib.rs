// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Synaptor Neural Core
//!
//! Types and pure algorithms shared by every projection:
//! - **Types**: errors, neuron state, the layer contract, simulation phase
//! - **Synapse**: synapse state, the sigmoidal weight contrast transform,
//!   transmission failure and conductance scaling
//!
//! Nothing in this crate owns a projection. Stateful controllers live in
//! `synaptor-npu-projection`; learning rules live in `synaptor-npu-plasticity`.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod types;

pub mod synapse;

// Re-export types
pub use types::{
    Layer, Neuron, Phase, PrjnError, PrjnLayer, Result, WeightLoadIssue,
};

// Re-export synapse
pub use synapse::{
    GScaleVals, PrjnScaleParams, SynComParams, Synapse, SynapseType, SynapseVar, WtSigParams,
};
