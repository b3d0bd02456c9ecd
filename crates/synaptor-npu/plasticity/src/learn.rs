// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */
//! Synaptic learning parameters
//!
//! Combines the XCAL error term, the optional BCM term and the linear-weight
//! soft bound into a per-synapse weight change.

use serde::{Deserialize, Serialize};
use synaptor_npu_neural::{Neuron, Synapse, WtSigParams};

use crate::wt_bal::WtBalParams;
use crate::xcal::XCalParams;

/// Soft-bound a linear-weight change
///
/// Increases shrink as `lwt` approaches 1, decreases as it approaches 0,
/// so that `lwt + dwt` stays in [0, 1] for `|dwt| <= 1`.
///
/// # Example
/// ```
/// use synaptor_npu_plasticity::soft_bound;
///
/// assert!((soft_bound(0.5, 0.9) - 0.05).abs() < 1e-6);
/// assert!((soft_bound(-0.5, 0.1) + 0.05).abs() < 1e-6);
/// ```
#[inline]
pub fn soft_bound(dwt: f32, lwt: f32) -> f32 {
    if dwt > 0.0 {
        dwt * (1.0 - lwt)
    } else {
        dwt * lwt
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnSynParams {
    pub learn: bool,
    /// Current learning rate
    pub lrate: f32,
    /// Base rate that `lrate_mult` scales from
    #[serde(skip)]
    pub lrate_init: f32,
    pub xcal: XCalParams,
    /// Contrast transform for the fixed-scale variant
    pub wt_sig: WtSigParams,
    pub wt_bal: WtBalParams,
}

impl Default for LearnSynParams {
    fn default() -> Self {
        Self {
            learn: true,
            lrate: 0.04,
            lrate_init: 0.04,
            xcal: XCalParams::default(),
            wt_sig: WtSigParams::default(),
            wt_bal: WtBalParams::default(),
        }
    }
}

impl LearnSynParams {
    /// Record the configured rate as the base rate
    pub fn update(&mut self) {
        self.lrate_init = self.lrate;
    }

    /// Set `lrate = lrate_init × mult`
    pub fn lrate_mult(&mut self, mult: f32) {
        self.lrate = self.lrate_init * mult;
    }

    /// Error-driven and BCM terms for a sender/receiver pair
    ///
    /// Returns `(err, bcm)`.
    #[inline]
    pub fn chl_dwt(&self, su: &Neuron, ru: &Neuron) -> (f32, f32) {
        let srs = su.avg_s_lrn * ru.avg_s_lrn;
        let srm = su.avg_m * ru.avg_m;
        let err = self.xcal.dwt(srs, srm);
        let bcm = self.xcal.dwt(srs, ru.avg_l);
        (err, bcm)
    }

    /// Sender falls below the learning threshold
    #[inline]
    pub fn sender_quiet(&self, su: &Neuron) -> bool {
        su.avg_s < self.xcal.lrn_thr && su.avg_m < self.xcal.lrn_thr
    }

    /// Soft-bounded, rate-scaled change to accumulate into `dwt`
    #[inline]
    pub fn syn_dwt(&self, su: &Neuron, ru: &Neuron, lwt: f32) -> f32 {
        let (err, bcm) = self.chl_dwt(su, ru);
        let dwt = self.xcal.m_lrn * err + self.xcal.long_lrate(ru.avg_l_lrn) * bcm;
        self.lrate * soft_bound(dwt, lwt)
    }

    /// Commit `dwt` for a fixed-scale synapse
    ///
    /// The change is weighted by the receiver's balance factors and bounded
    /// again against the current `lwt`. A zero change restores a weight
    /// zeroed by transmission failure.
    #[inline]
    pub fn wt_fm_dwt(&self, wb_inc: f32, wb_dec: f32, sy: &mut Synapse) {
        if sy.dwt == 0.0 {
            if sy.wt == 0.0 {
                sy.wt = sy.swt * self.wt_sig.sig_fm_lin_wt(sy.lwt);
            }
            return;
        }
        let dwt = if sy.dwt > 0.0 {
            wb_inc * (1.0 - sy.lwt) * sy.dwt
        } else {
            wb_dec * sy.lwt * sy.dwt
        };
        sy.lwt = (sy.lwt + dwt).clamp(0.0, 1.0);
        sy.wt = sy.swt * self.wt_sig.sig_fm_lin_wt(sy.lwt);
        sy.dwt = 0.0;
    }

    /// Linear weight for an effective weight under `scale`
    #[inline]
    pub fn lwt_from_scaled_wt(&self, wt: f32, scale: f32) -> f32 {
        if scale <= 0.0 {
            return 0.0;
        }
        self.wt_sig.lin_fm_sig_wt((wt / scale).clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn active(s: f32, m: f32) -> Neuron {
        Neuron {
            avg_s_lrn: s,
            avg_s: s,
            avg_m: m,
            ..Default::default()
        }
    }

    #[test]
    fn test_lrate_mult() {
        let mut l = LearnSynParams::default();
        l.update();
        l.lrate_mult(0.5);
        assert!((l.lrate - 0.02).abs() < 1e-7);
        l.lrate_mult(1.0);
        assert!((l.lrate - 0.04).abs() < 1e-7);
    }

    #[test]
    fn test_plus_exceeds_minus_potentiates() {
        let l = LearnSynParams::default();
        let su = active(0.8, 0.4);
        let ru = active(0.8, 0.4);
        assert!(l.syn_dwt(&su, &ru, 0.5) > 0.0);
    }

    #[test]
    fn test_minus_exceeds_plus_depresses() {
        let l = LearnSynParams::default();
        let su = active(0.3, 0.8);
        let ru = active(0.3, 0.8);
        assert!(l.syn_dwt(&su, &ru, 0.5) < 0.0);
    }

    #[test]
    fn test_sender_quiet() {
        let l = LearnSynParams::default();
        assert!(l.sender_quiet(&active(0.001, 0.001)));
        assert!(!l.sender_quiet(&active(0.001, 0.2)));
    }

    #[test]
    fn test_wt_fm_dwt_restores_failed_weight() {
        let l = LearnSynParams::default();
        let mut sy = Synapse {
            wt: 0.0,
            lwt: 0.5,
            swt: 1.0,
            dwt: 0.0,
        };
        l.wt_fm_dwt(1.0, 1.0, &mut sy);
        assert!((sy.wt - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_lwt_from_scaled_wt_zero_scale() {
        let l = LearnSynParams::default();
        assert_eq!(l.lwt_from_scaled_wt(0.3, 0.0), 0.0);
    }

    proptest! {
        #[test]
        fn prop_soft_bound_keeps_lwt_in_unit(lwt in 0.0f32..=1.0, dwt in -1.0f32..=1.0) {
            let next = lwt + soft_bound(dwt, lwt);
            prop_assert!((-1e-6..=1.0 + 1e-6).contains(&next));
        }

        #[test]
        fn prop_commit_stays_bounded(lwt in 0.0f32..=1.0, dwt in -1.0f32..=1.0,
                                     inc in 0.5f32..1.5, dec in 0.5f32..1.5) {
            let l = LearnSynParams::default();
            let mut sy = Synapse { wt: 0.5, lwt, swt: 1.0, dwt };
            l.wt_fm_dwt(inc, dec, &mut sy);
            prop_assert!((0.0..=1.0).contains(&sy.lwt));
            prop_assert!((0.0..=1.0).contains(&sy.wt));
            prop_assert_eq!(sy.dwt, 0.0);
        }
    }
}
