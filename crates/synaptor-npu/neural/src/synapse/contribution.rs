// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */
//! Synaptic contribution calculation
//!
//! A spike from a sender contributes `scale × wt` to every receiver's
//! delay-line slot. The sign is not applied here: excitatory and
//! inhibitory input land in separate conductance channels.

use serde::{Deserialize, Serialize};

use crate::types::Neuron;

/// Projection polarity: which conductance channel it drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynapseType {
    #[default]
    Excitatory = 0,
    Inhibitory = 1,
}

impl SynapseType {
    /// Add `g` to the channel this polarity drives
    #[inline]
    pub fn add_g(self, nrn: &mut Neuron, g: f32) {
        match self {
            SynapseType::Excitatory => nrn.ge_raw += g,
            SynapseType::Inhibitory => nrn.gi_raw += g,
        }
    }
}

/// Calculate synaptic contribution
///
/// # Example
/// ```
/// use synaptor_npu_neural::synapse::compute_synaptic_contribution;
///
/// assert_eq!(compute_synaptic_contribution(2.0, 0.25), 0.5);
/// ```
#[inline]
pub fn compute_synaptic_contribution(scale: f32, wt: f32) -> f32 {
    scale * wt
}
