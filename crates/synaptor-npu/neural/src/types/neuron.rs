// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! Per-neuron state read and written by projections
//!
//! A projection never integrates membrane dynamics. It reads the activity
//! averages that drive learning and writes raw conductance increments.

use serde::{Deserialize, Serialize};

/// Neuron state visible to projections
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neuron {
    /// Excluded from learning and initialization
    pub off: bool,
    /// 1.0 on the cycle the neuron spikes, 0.0 otherwise
    pub spike: f32,
    /// Raw excitatory conductance accumulated this cycle
    pub ge_raw: f32,
    /// Raw inhibitory conductance accumulated this cycle
    pub gi_raw: f32,
    /// Super-short time-scale activation average
    pub avg_ss: f32,
    /// Short time-scale activation average
    pub avg_s: f32,
    /// Medium time-scale activation average
    pub avg_m: f32,
    /// Short average as used in learning (mixes in a bit of `avg_m`)
    pub avg_s_lrn: f32,
    /// Long time-scale average (BCM floating threshold)
    pub avg_l: f32,
    /// Learning rate factor derived from `avg_l`
    pub avg_l_lrn: f32,
    /// Deviation of long-term average activity from its target
    pub avg_dif: f32,
}

impl Default for Neuron {
    fn default() -> Self {
        Self {
            off: false,
            spike: 0.0,
            ge_raw: 0.0,
            gi_raw: 0.0,
            avg_ss: 0.15,
            avg_s: 0.15,
            avg_m: 0.15,
            avg_s_lrn: 0.15,
            avg_l: 0.4,
            avg_l_lrn: 0.0,
            avg_dif: 0.0,
        }
    }
}

impl Neuron {
    #[inline]
    pub fn is_off(&self) -> bool {
        self.off
    }

    /// Zero the conductance accumulators
    #[inline]
    pub fn clear_g(&mut self) {
        self.ge_raw = 0.0;
        self.gi_raw = 0.0;
    }
}

/// Phase of the current trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Expectation phase; conductance statistics are collected
    #[default]
    Minus,
    /// Outcome phase; statistics are skipped
    Plus,
}

impl Phase {
    #[inline]
    pub fn is_plus(self) -> bool {
        matches!(self, Phase::Plus)
    }
}
