// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */
//! Neuron activity traces that drive learning
//!
//! Projections read these averages but never update them. They are provided
//! so callers can produce the traces from spikes.

use serde::{Deserialize, Serialize};
use synaptor_npu_neural::Neuron;

/// Cascaded short and medium time-scale averages
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LrnActAvgParams {
    /// Gain applied to a spike before integration
    pub spike_g: f32,
    pub ss_tau: f32,
    pub s_tau: f32,
    pub m_tau: f32,
    /// Share of `avg_m` mixed into `avg_s_lrn`
    pub lrn_m: f32,
    /// Initial value for all averages
    pub init: f32,
}

impl Default for LrnActAvgParams {
    fn default() -> Self {
        Self {
            spike_g: 8.0,
            ss_tau: 40.0,
            s_tau: 10.0,
            m_tau: 40.0,
            lrn_m: 0.1,
            init: 0.15,
        }
    }
}

impl LrnActAvgParams {
    pub fn init_avgs(&self, nrn: &mut Neuron) {
        nrn.avg_ss = self.init;
        nrn.avg_s = self.init;
        nrn.avg_m = self.init;
        nrn.avg_s_lrn = self.init;
    }

    /// Integrate one cycle of activity `act`
    pub fn avgs_fm_act(&self, act: f32, nrn: &mut Neuron) {
        nrn.avg_ss += (act - nrn.avg_ss) / self.ss_tau;
        nrn.avg_s += (nrn.avg_ss - nrn.avg_s) / self.s_tau;
        nrn.avg_m += (nrn.avg_s - nrn.avg_m) / self.m_tau;
        nrn.avg_s_lrn = (1.0 - self.lrn_m) * nrn.avg_s + self.lrn_m * nrn.avg_m;
    }

    /// Integrate the neuron's current spike
    pub fn avgs_fm_spike(&self, nrn: &mut Neuron) {
        let act = self.spike_g * nrn.spike;
        self.avgs_fm_act(act, nrn);
    }
}

/// Long time-scale average and the BCM learning factor derived from it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvgLParams {
    pub init: f32,
    /// Gain on `avg_m` driving the long average
    pub gain: f32,
    /// Floor of the long average
    pub min: f32,
    pub tau: f32,
    pub lrn_max: f32,
    pub lrn_min: f32,
    /// Modulate BCM learning by layer error
    pub err_mod: bool,
    pub mod_min: f32,
}

impl Default for AvgLParams {
    fn default() -> Self {
        Self {
            init: 0.4,
            gain: 2.5,
            min: 0.2,
            tau: 10.0,
            lrn_max: 0.5,
            lrn_min: 0.0001,
            err_mod: true,
            mod_min: 0.01,
        }
    }
}

impl AvgLParams {
    #[inline]
    pub fn lrn_fact(&self) -> f32 {
        (self.lrn_max - self.lrn_min) / (self.gain - self.min)
    }

    /// Update `avg_l` and `avg_l_lrn` from the neuron's `avg_m`
    pub fn avg_l_fm_avg_m(&self, nrn: &mut Neuron) {
        nrn.avg_l += (self.gain * nrn.avg_m - nrn.avg_l) / self.tau;
        if nrn.avg_l < self.min {
            nrn.avg_l = self.min;
        }
        nrn.avg_l_lrn = self.lrn_fact() * (nrn.avg_l - self.min);
    }

    /// Multiplier on BCM learning given the layer's average cosine difference
    pub fn err_mod_fm_lay_err(&self, lay_cos_diff_avg: f32) -> f32 {
        if !self.err_mod {
            return 1.0;
        }
        (1.0 - lay_cos_diff_avg).max(self.mod_min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cascade_rises_with_activity() {
        let p = LrnActAvgParams::default();
        let mut n = Neuron::default();
        p.init_avgs(&mut n);
        for _ in 0..200 {
            p.avgs_fm_act(1.0, &mut n);
        }
        assert!(n.avg_ss > n.avg_s);
        assert!(n.avg_s > n.avg_m);
        assert!(n.avg_m > 0.15);
        let mix = 0.9 * n.avg_s + 0.1 * n.avg_m;
        assert!((n.avg_s_lrn - mix).abs() < 1e-6);
    }

    #[test]
    fn test_spike_integration() {
        let p = LrnActAvgParams::default();
        let mut n = Neuron {
            spike: 1.0,
            ..Default::default()
        };
        p.init_avgs(&mut n);
        p.avgs_fm_spike(&mut n);
        assert!((n.avg_ss - (0.15 + (8.0 - 0.15) / 40.0)).abs() < 1e-6);
    }

    #[test]
    fn test_avg_l_floor() {
        let p = AvgLParams::default();
        let mut n = Neuron {
            avg_m: 0.0,
            avg_l: 0.2,
            ..Default::default()
        };
        p.avg_l_fm_avg_m(&mut n);
        assert_eq!(n.avg_l, 0.2);
        assert_eq!(n.avg_l_lrn, 0.0);
    }

    #[test]
    fn test_err_mod() {
        let p = AvgLParams::default();
        assert_eq!(p.err_mod_fm_lay_err(1.0), 0.01);
        assert!((p.err_mod_fm_lay_err(0.25) - 0.75).abs() < 1e-6);
    }
}
