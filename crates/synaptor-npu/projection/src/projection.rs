// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */
//! Projection controller
//!
//! Owns the synapses, connectivity, delay line and parameters of one
//! projection. Layers are passed in by the caller on each call; the
//! projection keeps only their names.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::{debug, info};

use synaptor_config::{ProjectionConfig, StructuralVariant};
use synaptor_npu_neural::synapse::SYNAPSE_VARS;
use synaptor_npu_neural::{
    GScaleVals, Phase, PrjnError, PrjnLayer, PrjnScaleParams, Result, SynComParams, Synapse,
    SynapseType, SynapseVar,
};
use synaptor_npu_plasticity::{LearnSynParams, SWtParams, WtBalRecvPrjn};

use crate::connectivity::ConnectivityTable;
use crate::delay_line::DelayLine;
use crate::pattern::ConnectivityPattern;
use crate::structural::StructuralAdapter;

#[derive(Debug, Clone)]
pub struct Projection {
    send_name: String,
    recv_name: String,
    params: ProjectionConfig,
    /// Runtime conductance scale and statistics
    pub gscale: GScaleVals,
    cons: ConnectivityTable,
    syns: Vec<Synapse>,
    gbuf: DelayLine,
    structural: StructuralAdapter,
    rng: StdRng,
}

/// Split the sender-major synapse array into one mutable row per sender
fn split_rows<'a>(mut syns: &'a mut [Synapse], counts: &[u32]) -> Vec<&'a mut [Synapse]> {
    let mut rows = Vec::with_capacity(counts.len());
    for &n in counts {
        let (row, rest) = std::mem::take(&mut syns).split_at_mut(n as usize);
        rows.push(row);
        syns = rest;
    }
    rows
}

impl Projection {
    /// Build connectivity between two layers and initialize weights
    ///
    /// # Errors
    ///
    /// `PrjnError::Structure` when the pattern cannot connect the layers.
    pub fn build<S, R>(
        send: &S,
        recv: &R,
        pattern: &dyn ConnectivityPattern,
        params: ProjectionConfig,
        seed: u64,
    ) -> Result<Self>
    where
        S: PrjnLayer + ?Sized,
        R: PrjnLayer + ?Sized,
    {
        let same_layer = send.name() == recv.name();
        let cons = ConnectivityTable::build(send.len(), recv.len(), pattern, same_layer)?;
        let mut pj = Self::from_table(send.name(), recv.name(), cons, params, seed)?;
        pj.init_wts(recv)?;
        info!(
            target: "synaptor_npu_projection",
            "Built {} projection {}: {} synapses ({:?}, delay {})",
            pattern.name(),
            pj.name(),
            pj.syns.len(),
            pj.params.variant,
            pj.params.com.delay
        );
        Ok(pj)
    }

    /// Wrap an existing connectivity table
    ///
    /// Weights start at zero (scale 1 for the fixed-scale variant); call
    /// [`Self::init_wts`] or [`Self::set_wts_fn`] before use.
    pub fn from_table(
        send_name: &str,
        recv_name: &str,
        cons: ConnectivityTable,
        mut params: ProjectionConfig,
        seed: u64,
    ) -> Result<Self> {
        cons.validate()?;
        params.learn.update();
        let recv_n = cons.recv_n();
        let mut syns = vec![Synapse::default(); cons.n_syns()];
        if params.variant == StructuralVariant::FixedScale {
            syns.iter_mut().for_each(|sy| sy.swt = 1.0);
        }
        let structural = StructuralAdapter::new(params.variant, recv_n, &params);
        Ok(Self {
            send_name: send_name.to_string(),
            recv_name: recv_name.to_string(),
            params,
            gscale: GScaleVals::default(),
            cons,
            syns,
            gbuf: DelayLine::new(recv_n, params.com.delay),
            structural,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// `Send->Recv`
    pub fn name(&self) -> String {
        format!("{}To{}", self.send_name, self.recv_name)
    }

    pub fn send_name(&self) -> &str {
        &self.send_name
    }

    pub fn recv_name(&self) -> &str {
        &self.recv_name
    }

    pub fn params(&self) -> &ProjectionConfig {
        &self.params
    }

    pub fn cons(&self) -> &ConnectivityTable {
        &self.cons
    }

    /// All synapses, sender-major
    pub fn syns(&self) -> &[Synapse] {
        &self.syns
    }

    pub fn delay_line(&self) -> &DelayLine {
        &self.gbuf
    }

    pub fn variant(&self) -> StructuralVariant {
        self.structural.variant()
    }

    pub fn polarity(&self) -> SynapseType {
        self.params.polarity
    }

    /// Per-receiver structural target means (adaptive variant only)
    pub fn swt_means(&self) -> Option<&[f32]> {
        match &self.structural {
            StructuralAdapter::AdaptiveSwt { swt_means } => Some(swt_means),
            StructuralAdapter::FixedScale { .. } => None,
        }
    }

    /// Per-receiver weight balance state (fixed-scale variant only)
    pub fn wt_bal(&self) -> Option<&[WtBalRecvPrjn]> {
        match &self.structural {
            StructuralAdapter::FixedScale { wt_bal } => Some(wt_bal),
            StructuralAdapter::AdaptiveSwt { .. } => None,
        }
    }

    ///////////////////////////////////////////////////////////////////////
    // Parameters

    pub fn set_learn(&mut self, learn: LearnSynParams) {
        self.params.learn = learn;
        self.params.learn.update();
    }

    pub fn set_swt(&mut self, swt: SWtParams) {
        self.params.swt = swt;
    }

    /// Change communication parameters; a new delay clears the delay line
    pub fn set_com(&mut self, com: SynComParams) {
        if com.delay != self.params.com.delay {
            self.gbuf = DelayLine::new(self.cons.recv_n(), com.delay);
        }
        self.params.com = com;
    }

    pub fn set_scale_params(&mut self, scale: PrjnScaleParams) {
        self.params.scale = scale;
    }

    pub fn set_gscale(&mut self, gscale: GScaleVals) {
        self.gscale = gscale;
    }

    /// `lrate = lrate_init × mult`
    pub fn lrate_mult(&mut self, mult: f32) {
        self.params.learn.lrate_mult(mult);
    }

    fn check_layer(&self, what: &str, expected: usize, got: usize) -> Result<()> {
        if expected != got {
            return Err(PrjnError::Structure(format!(
                "{} layer has {} units, projection {} was built for {}",
                what,
                got,
                self.name(),
                expected
            )));
        }
        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////
    // Initialization

    /// Draw fresh weights and reset all learning state
    ///
    /// Receivers that are off keep zero weights.
    pub fn init_wts<R: PrjnLayer + ?Sized>(&mut self, recv: &R) -> Result<()> {
        self.check_layer("receiving", self.cons.recv_n(), recv.len())?;
        self.structural.init(&self.params);
        let rnrns = recv.neurons();
        for (sy, &ri) in self.syns.iter_mut().zip(self.cons.s_con_idx()) {
            if rnrns[ri as usize].is_off() {
                continue;
            }
            self.structural.init_syn(&self.params, &mut self.rng, sy);
        }
        self.structural
            .rescale(&self.params, &self.cons, &mut self.syns, rnrns);
        self.init_gbuf();
        debug!(
            target: "synaptor_npu_projection",
            "Initialized weights for {}", self.name()
        );
        Ok(())
    }

    /// Clear pending conductance
    pub fn init_gbuf(&mut self) {
        self.gbuf.reset();
    }

    /// Set weights from a function of `(send, recv)`
    pub fn set_wts_fn<F: Fn(usize, usize) -> f32>(&mut self, f: F) {
        for si in 0..self.cons.send_n() {
            for k in self.cons.send_range(si) {
                let ri = self.cons.s_con_idx()[k] as usize;
                self.structural.set_wt(&self.params, &mut self.syns[k], f(si, ri));
            }
        }
    }

    /// Compute the conductance scale from expected sending activity
    ///
    /// `rel_sum` is the sum of `rel` over all projections of the same
    /// polarity into the receiving layer.
    pub fn init_gscale(&mut self, send_avg_act: f32, rel_sum: f32) {
        let rel = if rel_sum > 0.0 {
            self.params.scale.rel / rel_sum
        } else {
            self.params.scale.rel
        };
        self.gscale.rel = rel;
        self.gscale.scale = self.params.scale.full_scale(
            rel,
            send_avg_act,
            self.cons.send_n() as f32,
            self.cons.avg_recv_con(),
        );
        self.gscale.init();
    }

    /// Copy weights onto the reciprocal projection
    ///
    /// For every synapse `si -> ri` here, the synapse `ri -> si` in `rpj`
    /// receives this synapse's `wt`, `lwt` and `swt`. Returns the number
    /// of synapses copied.
    pub fn init_wt_sym(&self, rpj: &mut Projection) -> Result<usize> {
        if rpj.cons.send_n() != self.cons.recv_n() || rpj.cons.recv_n() != self.cons.send_n() {
            return Err(PrjnError::Structure(format!(
                "{} is not reciprocal to {}",
                rpj.name(),
                self.name()
            )));
        }
        let mut copied = 0;
        for si in 0..self.cons.send_n() {
            for k in self.cons.send_range(si) {
                let ri = self.cons.s_con_idx()[k] as usize;
                let Some(rk) = rpj.cons.locate_synapse(ri, si) else {
                    continue;
                };
                let sy = &self.syns[k];
                let rsy = &mut rpj.syns[rk];
                rsy.wt = sy.wt;
                rsy.lwt = sy.lwt;
                rsy.swt = sy.swt;
                copied += 1;
            }
        }
        Ok(copied)
    }

    ///////////////////////////////////////////////////////////////////////
    // Activation

    /// Schedule a spike from sender `si` on every receiver it connects to
    pub fn send_spike(&mut self, si: usize) -> Result<()> {
        if si >= self.cons.send_n() {
            return Err(PrjnError::Structure(format!(
                "sending index {} out of range for {} senders",
                si,
                self.cons.send_n()
            )));
        }
        let range = self.cons.send_range(si);
        let ridxs = &self.cons.s_con_idx()[range.clone()];
        self.gbuf.send(ridxs, &self.syns[range], self.gscale.scale);
        Ok(())
    }

    /// Deliver this cycle's conductance into the receiving layer
    ///
    /// In the minus phase delivery statistics update the running averages
    /// used by scale adaptation. Silent cycles leave them untouched.
    pub fn recv_g_inc<R: PrjnLayer + ?Sized>(&mut self, phase: Phase, recv: &mut R) -> Result<()> {
        self.check_layer("receiving", self.cons.recv_n(), recv.len())?;
        let stats = self.gbuf.drain(recv.neurons_mut(), self.params.polarity);
        if !phase.is_plus() && stats.n > 0 {
            self.gscale
                .update_stats(stats.avg, stats.max, self.params.scale.avg_dt());
        }
        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////
    // Learning

    /// Accumulate XCAL weight changes
    ///
    /// Rows of quiet senders are skipped. Returns the number of synapses
    /// that accumulated a change.
    pub fn dwt<S, R>(&mut self, send: &S, recv: &R) -> Result<usize>
    where
        S: PrjnLayer + ?Sized,
        R: PrjnLayer + ?Sized,
    {
        if !self.params.learn.learn {
            return Ok(0);
        }
        self.check_layer("sending", self.cons.send_n(), send.len())?;
        self.check_layer("receiving", self.cons.recv_n(), recv.len())?;

        let learn = &self.params.learn;
        let cons = &self.cons;
        let snrns = send.neurons();
        let rnrns = recv.neurons();
        let rows = split_rows(&mut self.syns, cons.s_con_n());

        let learned: usize = rows
            .into_par_iter()
            .enumerate()
            .map(|(si, row)| {
                let sn = &snrns[si];
                if learn.sender_quiet(sn) {
                    return 0;
                }
                for (sy, &ri) in row.iter_mut().zip(cons.send_recv_idxs(si)) {
                    sy.dwt += learn.syn_dwt(sn, &rnrns[ri as usize], sy.lwt);
                }
                row.len()
            })
            .sum();

        debug!(
            target: "synaptor_npu_projection",
            "{}: dwt over {} synapses", self.name(), learned
        );
        Ok(learned)
    }

    /// Subtract each receiver's mean weight change from its synapses
    ///
    /// Only changes above `dwt_thr × lrate` in magnitude take part, and
    /// only when more than one does. Skipped for target layers.
    pub fn dwt_sub_mean<R: PrjnLayer + ?Sized>(&mut self, recv: &R) -> Result<()> {
        let learn = &self.params.learn;
        if !learn.learn || learn.xcal.sub_mean == 0.0 || recv.is_target() {
            return Ok(());
        }
        self.check_layer("receiving", self.cons.recv_n(), recv.len())?;
        let sm = learn.xcal.sub_mean;
        let thr = learn.xcal.dwt_thr * learn.lrate;
        for ri in 0..self.cons.recv_n() {
            let idxs = self.cons.recv_syn_idxs(ri);
            let (mut sum, mut n) = (0.0f32, 0usize);
            for &k in idxs {
                let dw = self.syns[k as usize].dwt;
                if dw.abs() > thr {
                    sum += dw;
                    n += 1;
                }
            }
            if n <= 1 {
                continue;
            }
            let mean = sum / n as f32;
            for &k in idxs {
                let sy = &mut self.syns[k as usize];
                if sy.dwt.abs() > thr {
                    sy.dwt -= sm * mean;
                }
            }
        }
        Ok(())
    }

    /// Commit pending changes into the linear weights
    ///
    /// Transmission failure, if enabled, is applied after the commit.
    pub fn wt_fm_dwt(&mut self) {
        if !self.params.learn.learn {
            return;
        }
        let params = &self.params;
        let structural = &self.structural;
        self.syns
            .par_iter_mut()
            .zip(self.cons.s_con_idx().par_iter())
            .for_each(|(sy, &ri)| structural.commit(params, ri as usize, sy));

        if self.params.com.p_fail > 0.0 {
            let com = self.params.com;
            for sy in self.syns.iter_mut() {
                com.wt_fail(&mut self.rng, &mut sy.wt, sy.swt);
            }
        }
    }

    /// Slow homeostatic adaptation
    ///
    /// Structural rescaling or weight balance, then conductance scale
    /// adaptation when enabled. Skipped when learning is off or the
    /// receiving layer is a target.
    pub fn slow_adapt<R: PrjnLayer + ?Sized>(&mut self, recv: &R) -> Result<()> {
        if !self.params.learn.learn || recv.is_target() {
            return Ok(());
        }
        self.check_layer("receiving", self.cons.recv_n(), recv.len())?;
        self.structural
            .slow_adapt(&self.params, &self.cons, &mut self.syns, recv.neurons());
        if self.params.scale.adapt && self.gscale.adapt(&self.params.scale) {
            debug!(
                target: "synaptor_npu_projection",
                "{}: gscale {} (err {})", self.name(), self.gscale.scale, self.gscale.err
            );
        }
        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////
    // Synapse variable access

    /// Variable names in index order
    pub fn syn_var_names(&self) -> &'static [&'static str] {
        &SYNAPSE_VARS
    }

    /// Index of a variable name
    pub fn syn_var_index(&self, name: &str) -> Result<usize> {
        SynapseVar::from_name(name)
            .map(SynapseVar::index)
            .ok_or_else(|| PrjnError::UnknownVariable(name.to_string()))
    }

    /// Synapse index connecting `si` to `ri`
    pub fn syn_index(&self, si: usize, ri: usize) -> Option<usize> {
        self.cons.find_synapse(si, ri)
    }

    /// Value by variable and synapse index; NaN when either is invalid
    pub fn syn_val_1d(&self, var_idx: usize, syn_idx: usize) -> f32 {
        self.syns
            .get(syn_idx)
            .map_or(f32::NAN, |sy| sy.var_by_index(var_idx))
    }

    /// Every synapse's value of a variable, sender-major
    pub fn syn_vals(&self, name: &str, vals: &mut Vec<f32>) -> Result<()> {
        let var = SynapseVar::from_name(name).ok_or_else(|| PrjnError::UnknownVariable(name.to_string()))?;
        vals.clear();
        vals.extend(self.syns.iter().map(|sy| sy.get(var)));
        Ok(())
    }

    /// Value of a variable on the synapse `si -> ri`
    ///
    /// NaN when the variable is unknown or the units are not connected.
    pub fn synapse_value(&self, name: &str, si: usize, ri: usize) -> f32 {
        match (SynapseVar::from_name(name), self.cons.find_synapse(si, ri)) {
            (Some(var), Some(k)) => self.syns[k].get(var),
            _ => f32::NAN,
        }
    }

    /// Set a variable on the synapse `si -> ri`
    ///
    /// Setting `Wt` re-derives the linear weight; setting `LWt` or `SWt`
    /// recomputes `Wt`. Fails without side effects on an unknown variable
    /// or an unconnected pair.
    pub fn set_synapse_value(&mut self, name: &str, si: usize, ri: usize, val: f32) -> Result<()> {
        let var = SynapseVar::from_name(name).ok_or_else(|| PrjnError::UnknownVariable(name.to_string()))?;
        let k = self
            .cons
            .find_synapse(si, ri)
            .ok_or(PrjnError::NotConnected { send: si, recv: ri })?;
        let sy = &mut self.syns[k];
        match var {
            SynapseVar::Wt => self.structural.set_wt(&self.params, sy, val),
            SynapseVar::LWt | SynapseVar::SWt => {
                sy.set(var, val);
                sy.wt = self.structural.wt_from_lwt(&self.params, sy);
            }
            SynapseVar::DWt => sy.dwt = val,
        }
        Ok(())
    }
}
