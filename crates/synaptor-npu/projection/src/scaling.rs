// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */
//! Layer-level conductance scale normalisation
//!
//! Projections into the same receiving layer share their relative scales:
//! each polarity's `rel` values are normalised to sum to one.

use tracing::debug;

use synaptor_npu_neural::{PrjnError, Result, SynapseType};

use crate::projection::Projection;

fn polarity_sum<F>(prjns: &[&mut Projection], polarity: SynapseType, f: F) -> f32
where
    F: Fn(&Projection) -> f32,
{
    prjns
        .iter()
        .filter(|pj| pj.polarity() == polarity)
        .map(|pj| f(&**pj))
        .sum()
}

/// Compute the conductance scale of every projection into one layer
///
/// `send_avg_acts[i]` is the expected activity of projection `i`'s sending
/// layer.
pub fn init_gscales(prjns: &mut [&mut Projection], send_avg_acts: &[f32]) -> Result<()> {
    if prjns.len() != send_avg_acts.len() {
        return Err(PrjnError::InvalidParameter(format!(
            "{} projections but {} sending activity estimates",
            prjns.len(),
            send_avg_acts.len()
        )));
    }
    let ex_sum = polarity_sum(prjns, SynapseType::Excitatory, |pj| pj.params().scale.rel);
    let inh_sum = polarity_sum(prjns, SynapseType::Inhibitory, |pj| pj.params().scale.rel);
    for (pj, &act) in prjns.iter_mut().zip(send_avg_acts) {
        let rel_sum = match pj.polarity() {
            SynapseType::Excitatory => ex_sum,
            SynapseType::Inhibitory => inh_sum,
        };
        pj.init_gscale(act, rel_sum);
        debug!(
            target: "synaptor_npu_projection",
            "{}: gscale {} (rel {})", pj.name(), pj.gscale.scale, pj.gscale.rel
        );
    }
    Ok(())
}

/// Share of each projection in its polarity's summed peak conductance
///
/// Sets `avg_max_rel = avg_max / sum(avg_max)`; unchanged when the sum
/// is zero.
pub fn update_avg_max_rel(prjns: &mut [&mut Projection]) {
    let ex_sum = polarity_sum(prjns, SynapseType::Excitatory, |pj| pj.gscale.avg_max);
    let inh_sum = polarity_sum(prjns, SynapseType::Inhibitory, |pj| pj.gscale.avg_max);
    for pj in prjns.iter_mut() {
        let sum = match pj.polarity() {
            SynapseType::Excitatory => ex_sum,
            SynapseType::Inhibitory => inh_sum,
        };
        if sum > 0.0 {
            pj.gscale.avg_max_rel = pj.gscale.avg_max / sum;
        }
    }
}
