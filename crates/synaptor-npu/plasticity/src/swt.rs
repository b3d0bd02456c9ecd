// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */
//! Structural weights
//!
//! In the adaptive variant every synapse carries a slowly changing
//! structural weight `swt` alongside the fast linear weight `lwt`:
//!
//! `wt = swt × 2 × sig(lwt)`
//!
//! so `lwt = 0.5` yields `wt = swt`. Slow adaptation moves `swt` toward
//! `wt`, then rescales each receiver's structural weights toward an
//! adaptive target mean.

use rand::Rng;
use serde::{Deserialize, Serialize};
use synaptor_npu_neural::synapse::sig_fun;
use synaptor_npu_neural::Synapse;

/// Closed interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMax {
    pub min: f32,
    pub max: f32,
}

impl MinMax {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn clip(&self, v: f32) -> f32 {
        v.clamp(self.min, self.max)
    }

    /// Soft-bounded step of `delta` from `v` toward the edges of the range
    #[inline]
    pub fn soft_step(&self, v: f32, delta: f32) -> f32 {
        if delta > 0.0 {
            v + (self.max - v) * delta
        } else {
            v + (v - self.min) * delta
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SWtInitParams {
    /// Mean initial weight
    pub mean: f32,
    /// Half-width of the uniform initial distribution
    pub var: f32,
    /// Share of the initial variance carried by `swt`
    pub s_pct: f32,
    /// Copy weights onto reciprocal projections after initialization
    pub sym: bool,
}

impl Default for SWtInitParams {
    fn default() -> Self {
        Self {
            mean: 0.5,
            var: 0.25,
            s_pct: 0.5,
            sym: true,
        }
    }
}

impl SWtInitParams {
    /// Uniform draw in `[-var, var]`
    #[inline]
    pub fn rnd_var<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        self.var * (2.0 * rng.gen::<f32>() - 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SWtAdaptParams {
    pub on: bool,
    /// Rate at which `swt` tracks `wt` and the target mean tracks activity
    pub lrate: f32,
    /// Gain of the contrast sigmoid over `lwt`
    pub sig_gain: f32,
    /// Subtractive instead of divisive rescaling
    pub sub_norm: bool,
}

impl Default for SWtAdaptParams {
    fn default() -> Self {
        Self {
            on: true,
            lrate: 0.1,
            sig_gain: 6.0,
            sub_norm: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SWtLimitParams {
    /// Range of structural weights
    pub swt: MinMax,
    /// Range of per-receiver target means
    pub mean: MinMax,
    pub soft_bound: bool,
}

impl Default for SWtLimitParams {
    fn default() -> Self {
        Self {
            swt: MinMax::new(0.2, 0.8),
            mean: MinMax::new(0.4, 0.6),
            soft_bound: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SWtParams {
    pub init: SWtInitParams,
    pub adapt: SWtAdaptParams,
    pub limit: SWtLimitParams,
}

impl SWtParams {
    #[inline]
    pub fn clip_swt(&self, swt: f32) -> f32 {
        self.limit.swt.clip(swt)
    }

    /// `2 × sig(lwt)`, centred so that `lwt = 0.5` maps to 1
    #[inline]
    pub fn sig_fm_lin_wt(&self, lwt: f32) -> f32 {
        (2.0 * sig_fun(lwt as f64, self.adapt.sig_gain as f64, 1.0)) as f32
    }

    /// Inverse of [`SWtParams::sig_fm_lin_wt`]
    #[inline]
    pub fn lin_fm_sig_wt(&self, wt: f32) -> f32 {
        let w = ((wt * 0.5) as f64).clamp(0.0, 1.0);
        if w <= 0.0 {
            return 0.0;
        }
        if w >= 1.0 {
            return 1.0;
        }
        (1.0 / (1.0 + ((1.0 - w) / w).powf(1.0 / self.adapt.sig_gain as f64))) as f32
    }

    /// Effective weight
    ///
    /// # Example
    /// ```
    /// use synaptor_npu_plasticity::SWtParams;
    ///
    /// let p = SWtParams::default();
    /// assert!((p.wt_val(0.4, 0.5) - 0.4).abs() < 1e-6);
    /// ```
    #[inline]
    pub fn wt_val(&self, swt: f32, lwt: f32) -> f32 {
        swt * self.sig_fm_lin_wt(lwt)
    }

    /// Linear weight that reproduces `wt` under `swt`
    #[inline]
    pub fn lwt_from_wt(&self, wt: f32, swt: f32) -> f32 {
        if swt <= 0.0 {
            return 0.0;
        }
        self.lin_fm_sig_wt(wt / swt)
    }

    /// Draw initial weights for one synapse
    ///
    /// `wt` is recomputed from the drawn `swt` and `lwt` so that the
    /// effective weight identity holds exactly after initialization.
    pub fn init_wts_syn<R: Rng + ?Sized>(&self, rng: &mut R, sy: &mut Synapse, mean: f32) {
        let wtv = self.init.rnd_var(rng);
        let wt = mean + wtv;
        sy.swt = self.clip_swt(mean + self.init.s_pct * wtv);
        sy.lwt = self.lwt_from_wt(wt, sy.swt);
        sy.wt = self.wt_val(sy.swt, sy.lwt);
        sy.dwt = 0.0;
    }

    /// Commit `dwt` into `lwt` and recompute `wt`
    ///
    /// The change has already been soft-bounded when it was computed. A
    /// zero change restores a weight zeroed by transmission failure.
    #[inline]
    pub fn wt_fm_dwt(&self, sy: &mut Synapse) {
        if sy.dwt == 0.0 {
            if sy.wt == 0.0 {
                sy.wt = self.wt_val(sy.swt, sy.lwt);
            }
            return;
        }
        sy.lwt = (sy.lwt + sy.dwt).clamp(0.0, 1.0);
        sy.wt = self.wt_val(sy.swt, sy.lwt);
        sy.dwt = 0.0;
    }

    /// Move a receiver's target mean by `-lrate × avg_dif`
    pub fn adapt_mean(&self, mean: f32, avg_dif: f32) -> f32 {
        let dadif = -self.adapt.lrate * avg_dif;
        if self.limit.soft_bound {
            self.limit.mean.soft_step(mean, dadif)
        } else {
            self.limit.mean.clip(mean + dadif)
        }
    }

    /// Move each structural weight of a receiver toward its effective weight
    ///
    /// `lwt` is re-derived so that `wt` is unchanged.
    pub fn swt_fm_wt_recv(&self, syns: &mut [Synapse], idxs: &[u32]) {
        let lr = self.adapt.lrate;
        for &i in idxs {
            let sy = &mut syns[i as usize];
            let dswt = lr * (sy.wt - sy.swt);
            sy.swt = if self.limit.soft_bound {
                self.limit.swt.soft_step(sy.swt, dswt)
            } else {
                self.clip_swt(sy.swt + dswt)
            };
            sy.lwt = self.lwt_from_wt(sy.wt, sy.swt);
        }
    }

    /// Rescale a receiver's structural weights toward `target`
    ///
    /// Synapses already at the bound in the direction of the correction
    /// are held fixed and left out of the correction's denominator.
    /// Receivers with fewer than two synapses are skipped.
    /// Returns true when any weight moved.
    pub fn rescale_recv(&self, syns: &mut [Synapse], idxs: &[u32], target: f32) -> bool {
        let nc = idxs.len();
        if nc <= 1 {
            return false;
        }
        let lim = self.limit.swt;
        let sum: f32 = idxs.iter().map(|&i| syns[i as usize].swt).sum();
        let want = target * nc as f32;
        if want == sum {
            return false;
        }
        let increase = want > sum;
        let movable = |swt: f32| if increase { swt < lim.max } else { swt > lim.min };

        let (mut n_mov, mut sum_mov) = (0usize, 0.0f32);
        for &i in idxs {
            let swt = syns[i as usize].swt;
            if movable(swt) {
                n_mov += 1;
                sum_mov += swt;
            }
        }
        if n_mov == 0 {
            return false;
        }
        let fixed = sum - sum_mov;

        if self.adapt.sub_norm {
            let delta = (want - sum) / n_mov as f32;
            for &i in idxs {
                let sy = &mut syns[i as usize];
                if movable(sy.swt) {
                    sy.swt = self.clip_swt(sy.swt + delta);
                    sy.wt = self.wt_val(sy.swt, sy.lwt);
                }
            }
        } else {
            if sum_mov <= 0.0 {
                return false;
            }
            let mdf = ((want - fixed) / sum_mov).max(0.0);
            for &i in idxs {
                let sy = &mut syns[i as usize];
                if movable(sy.swt) {
                    sy.swt = self.clip_swt(sy.swt * mdf);
                    sy.wt = self.wt_val(sy.swt, sy.lwt);
                }
            }
        }
        true
    }
}
