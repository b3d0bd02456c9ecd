// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */
//! Structural adapters
//!
//! The slow weight component of a synapse lives in its `swt` slot. How it
//! combines with the linear weight, and how it adapts, depends on the
//! variant chosen when the projection is built.

use rand::Rng;
use synaptor_config::{ProjectionConfig, StructuralVariant};
use synaptor_npu_neural::{Neuron, Synapse};
use synaptor_npu_plasticity::WtBalRecvPrjn;

use crate::connectivity::ConnectivityTable;

#[derive(Debug, Clone, PartialEq)]
pub enum StructuralAdapter {
    /// `wt = scale × sig(lwt)`, slow adaptation by weight balance
    FixedScale { wt_bal: Vec<WtBalRecvPrjn> },
    /// `wt = swt × 2 × sig(lwt)`, slow adaptation by structural rescaling
    AdaptiveSwt { swt_means: Vec<f32> },
}

impl StructuralAdapter {
    pub fn new(variant: StructuralVariant, recv_n: usize, params: &ProjectionConfig) -> Self {
        match variant {
            StructuralVariant::FixedScale => StructuralAdapter::FixedScale {
                wt_bal: vec![WtBalRecvPrjn::default(); recv_n],
            },
            StructuralVariant::AdaptiveSwt => StructuralAdapter::AdaptiveSwt {
                swt_means: vec![params.swt.init.mean; recv_n],
            },
        }
    }

    pub fn variant(&self) -> StructuralVariant {
        match self {
            StructuralAdapter::FixedScale { .. } => StructuralVariant::FixedScale,
            StructuralAdapter::AdaptiveSwt { .. } => StructuralVariant::AdaptiveSwt,
        }
    }

    /// Reset per-receiver state
    pub fn init(&mut self, params: &ProjectionConfig) {
        match self {
            StructuralAdapter::FixedScale { wt_bal } => wt_bal.iter_mut().for_each(WtBalRecvPrjn::init),
            StructuralAdapter::AdaptiveSwt { swt_means } => {
                swt_means.iter_mut().for_each(|m| *m = params.swt.init.mean)
            }
        }
    }

    /// Effective weight for the synapse's current `lwt` and `swt`
    #[inline]
    pub fn wt_from_lwt(&self, params: &ProjectionConfig, sy: &Synapse) -> f32 {
        match self {
            StructuralAdapter::FixedScale { .. } => sy.swt * params.learn.wt_sig.sig_fm_lin_wt(sy.lwt),
            StructuralAdapter::AdaptiveSwt { .. } => params.swt.wt_val(sy.swt, sy.lwt),
        }
    }

    /// Draw initial weights
    pub fn init_syn<R: Rng + ?Sized>(&self, params: &ProjectionConfig, rng: &mut R, sy: &mut Synapse) {
        let init = &params.swt.init;
        match self {
            StructuralAdapter::FixedScale { .. } => {
                let wt = (init.mean + init.rnd_var(rng)).clamp(0.0, 1.0);
                sy.lwt = params.learn.lwt_from_scaled_wt(wt, sy.swt);
                sy.wt = self.wt_from_lwt(params, sy);
                sy.dwt = 0.0;
            }
            StructuralAdapter::AdaptiveSwt { .. } => {
                params.swt.init_wts_syn(rng, sy, init.mean);
            }
        }
    }

    /// Set the effective weight directly
    ///
    /// Adaptive: the value becomes the structural weight with `lwt = 0.5`.
    /// Fixed: `lwt` is re-derived under the existing scale and `wt` follows
    /// from it, so values outside `[0, scale]` saturate.
    pub fn set_wt(&self, params: &ProjectionConfig, sy: &mut Synapse, wt: f32) {
        match self {
            StructuralAdapter::FixedScale { .. } => {
                sy.lwt = params.learn.lwt_from_scaled_wt(wt, sy.swt);
                sy.wt = self.wt_from_lwt(params, sy);
            }
            StructuralAdapter::AdaptiveSwt { .. } => {
                sy.swt = wt;
                sy.lwt = 0.5;
                sy.wt = params.swt.wt_val(sy.swt, sy.lwt);
            }
        }
    }

    /// Commit a synapse's pending change
    #[inline]
    pub fn commit(&self, params: &ProjectionConfig, ri: usize, sy: &mut Synapse) {
        match self {
            StructuralAdapter::FixedScale { wt_bal } => {
                let (inc, dec) = if params.learn.wt_bal.on {
                    (wt_bal[ri].inc, wt_bal[ri].dec)
                } else {
                    (1.0, 1.0)
                };
                params.learn.wt_fm_dwt(inc, dec, sy);
            }
            StructuralAdapter::AdaptiveSwt { .. } => params.swt.wt_fm_dwt(sy),
        }
    }

    /// Structural rescale of every receiver toward its target mean
    ///
    /// No-op for the fixed-scale variant. Returns the number of receivers
    /// whose weights moved. Receivers that are off are left alone.
    pub fn rescale(
        &self,
        params: &ProjectionConfig,
        cons: &ConnectivityTable,
        syns: &mut [Synapse],
        recv: &[Neuron],
    ) -> usize {
        let StructuralAdapter::AdaptiveSwt { swt_means } = self else {
            return 0;
        };
        (0..cons.recv_n())
            .filter(|&ri| !recv[ri].is_off())
            .filter(|&ri| params.swt.rescale_recv(syns, cons.recv_syn_idxs(ri), swt_means[ri]))
            .count()
    }

    /// Slow adaptation over all receivers
    pub fn slow_adapt(
        &mut self,
        params: &ProjectionConfig,
        cons: &ConnectivityTable,
        syns: &mut [Synapse],
        recv: &[Neuron],
    ) {
        match self {
            StructuralAdapter::FixedScale { wt_bal } => {
                if !params.learn.wt_bal.on {
                    return;
                }
                for (ri, wb) in wt_bal.iter_mut().enumerate() {
                    if recv[ri].is_off() {
                        continue;
                    }
                    let idxs = cons.recv_syn_idxs(ri);
                    wb.update(&params.learn.wt_bal, idxs.iter().map(|&k| syns[k as usize].wt));
                }
            }
            StructuralAdapter::AdaptiveSwt { swt_means } => {
                if !params.swt.adapt.on {
                    return;
                }
                for (ri, mean) in swt_means.iter_mut().enumerate() {
                    let rn = &recv[ri];
                    if rn.is_off() {
                        continue;
                    }
                    *mean = params.swt.adapt_mean(*mean, rn.avg_dif);
                    params.swt.swt_fm_wt_recv(syns, cons.recv_syn_idxs(ri));
                }
                for (ri, &mean) in swt_means.iter().enumerate() {
                    if !recv[ri].is_off() {
                        params.swt.rescale_recv(syns, cons.recv_syn_idxs(ri), mean);
                    }
                }
            }
        }
    }
}
