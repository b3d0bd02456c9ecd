// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */
//! Synaptic communication parameters: axonal delay and transmission failure

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynComParams {
    /// Cycles between a send and its delivery; 0 delivers on the same cycle
    pub delay: usize,
    /// Probability that a synapse fails to transmit on a given weight update
    pub p_fail: f32,
    /// Scale failure by `1 - swt`; strong structural weights fail less
    pub p_fail_swt: bool,
}

impl Default for SynComParams {
    fn default() -> Self {
        Self {
            delay: 2,
            p_fail: 0.0,
            p_fail_swt: false,
        }
    }
}

impl SynComParams {
    /// Failure probability for a synapse with the given structural weight
    #[inline]
    pub fn wt_fail_p(&self, swt: f32) -> f32 {
        if self.p_fail_swt {
            self.p_fail * (1.0 - swt)
        } else {
            self.p_fail
        }
    }

    /// Zero `wt` with the failure probability
    #[inline]
    pub fn wt_fail<R: Rng + ?Sized>(&self, rng: &mut R, wt: &mut f32, swt: f32) {
        let fp = self.wt_fail_p(swt);
        if fp <= 0.0 {
            return;
        }
        if rng.gen::<f32>() < fp {
            *wt = 0.0;
        }
    }
}
