// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */
//! # Synaptor Plasticity Module
//!
//! Learning rules applied to projection synapses:
//! - XCAL error-driven learning (`xcal`, `learn`)
//! - Structural weights and their homeostatic rescaling (`swt`)
//! - Weight balance for fixed-scale projections (`wt_bal`)
//! - Neuron activity traces that drive learning (`act_avg`)
//!
//! ## Architecture
//! - Parameter structs are plain data, owned by each projection
//! - Kernels are pure functions over synapse slices
//! - No locking; callers decide on parallelism

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod act_avg;
pub mod learn;
pub mod swt;
pub mod wt_bal;
pub mod xcal;

// Re-export key types
pub use act_avg::{AvgLParams, LrnActAvgParams};
pub use learn::{soft_bound, LearnSynParams};
pub use swt::{MinMax, SWtAdaptParams, SWtInitParams, SWtLimitParams, SWtParams};
pub use wt_bal::{WtBalParams, WtBalRecvPrjn};
pub use xcal::XCalParams;
