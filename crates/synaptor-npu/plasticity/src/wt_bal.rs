// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */
//! Weight balance for fixed-scale projections
//!
//! Keeps the average weight into each receiver within a band by scaling
//! the size of positive and negative weight changes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WtBalParams {
    pub on: bool,
    /// Only weights at or above this enter the average
    pub avg_thr: f32,
    /// Average above which increases are damped
    pub hi_thr: f32,
    pub hi_gain: f32,
    /// Average below which decreases are damped
    pub lo_thr: f32,
    pub lo_gain: f32,
}

impl Default for WtBalParams {
    fn default() -> Self {
        Self {
            on: false,
            avg_thr: 0.25,
            hi_thr: 0.4,
            hi_gain: 4.0,
            lo_thr: 0.4,
            lo_gain: 6.0,
        }
    }
}

impl WtBalParams {
    /// Balance factors `(fact, inc, dec)` for a receiver's average weight
    ///
    /// # Example
    /// ```
    /// use synaptor_npu_plasticity::WtBalParams;
    ///
    /// let wb = WtBalParams::default();
    /// let (_, inc, dec) = wb.wt_bal(0.6);
    /// assert!(inc < 1.0 && dec > 1.0);
    /// ```
    pub fn wt_bal(&self, wb_avg: f32) -> (f32, f32, f32) {
        let mut fact = 0.0;
        let mut inc = 1.0;
        let mut dec = 1.0;
        if wb_avg < self.lo_thr {
            let wb_avg = wb_avg.max(self.avg_thr);
            fact = self.lo_gain * (self.lo_thr - wb_avg);
            dec = 1.0 / (1.0 + fact);
            inc = 2.0 - dec;
        } else if wb_avg > self.hi_thr {
            fact = self.hi_gain * (wb_avg - self.hi_thr);
            inc = 1.0 / (1.0 + fact);
            dec = 2.0 - inc;
        }
        (fact, inc, dec)
    }
}

/// Per-receiver weight balance state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WtBalRecvPrjn {
    pub avg: f32,
    pub fact: f32,
    pub inc: f32,
    pub dec: f32,
}

impl Default for WtBalRecvPrjn {
    fn default() -> Self {
        Self {
            avg: 0.0,
            fact: 0.0,
            inc: 1.0,
            dec: 1.0,
        }
    }
}

impl WtBalRecvPrjn {
    pub fn init(&mut self) {
        *self = Self::default();
    }

    /// Recompute from the receiver's weights
    pub fn update<I: IntoIterator<Item = f32>>(&mut self, params: &WtBalParams, wts: I) {
        let mut sum = 0.0;
        let mut n = 0usize;
        for wt in wts {
            if wt >= params.avg_thr {
                sum += wt;
                n += 1;
            }
        }
        self.avg = if n > 0 { sum / n as f32 } else { 0.0 };
        let (fact, inc, dec) = params.wt_bal(self.avg);
        self.fact = fact;
        self.inc = inc;
        self.dec = dec;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inside_band_is_neutral() {
        let wb = WtBalParams::default();
        assert_eq!(wb.wt_bal(0.4), (0.0, 1.0, 1.0));
    }

    #[test]
    fn test_low_average_damps_decreases() {
        let wb = WtBalParams::default();
        let (fact, inc, dec) = wb.wt_bal(0.3);
        assert!((fact - 0.6).abs() < 1e-6);
        assert!((dec - 1.0 / 1.6).abs() < 1e-6);
        assert!((inc + dec - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_low_average_floored_at_avg_thr() {
        let wb = WtBalParams::default();
        assert_eq!(wb.wt_bal(0.0), wb.wt_bal(0.25));
    }

    #[test]
    fn test_update_ignores_small_weights() {
        let wb = WtBalParams::default();
        let mut st = WtBalRecvPrjn::default();
        st.update(&wb, [0.1, 0.5, 0.7]);
        assert!((st.avg - 0.6).abs() < 1e-6);
        assert!(st.inc < 1.0);
    }
}
