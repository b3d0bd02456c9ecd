// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */
//! # Synaptor Projection Engine
//!
//! A projection carries spikes from a sending layer to a receiving layer
//! through a sparse set of learnable synapses:
//! - **Connectivity**: dual sender-major / receiver-major index over one synapse array
//! - **Delay line**: per-receiver ring buffer of pending conductance
//! - **Learning**: XCAL weight changes, mean subtraction, commit
//! - **Slow adaptation**: structural weight rescaling or weight balance, conductance scale homeostasis
//! - **Weight files**: JSON read/write of effective weights
//!
//! ## Cycle
//! ```text
//! send_spike(si)*  ->  recv_g_inc(phase)          every cycle
//! dwt  ->  dwt_sub_mean  ->  wt_fm_dwt            end of trial
//! slow_adapt                                      every few trials
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod connectivity;
pub mod delay_line;
pub mod pattern;
pub mod projection;
pub mod scaling;
pub mod structural;
pub mod weights;

pub use connectivity::ConnectivityTable;
pub use delay_line::{DelayLine, DrainStats, RingIdx};
pub use pattern::{ConnectivityPattern, ExplicitPattern, Full, OneToOne, UniformRandom};
pub use projection::Projection;
pub use scaling::{init_gscales, update_avg_max_rel};
pub use structural::StructuralAdapter;
pub use weights::{format_g, PrjnWeights, RecvWeights, GSCALE_KEY, WEIGHT_PREC};

pub use synaptor_config::{ProjectionConfig, StructuralVariant};
