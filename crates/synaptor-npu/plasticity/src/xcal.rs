// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */
//! XCAL learning function
//!
//! Piecewise-linear approximation of the BCM-style weight change curve:
//! zero below a small threshold, a negative ramp up to a reversal point,
//! then `sr - thr` above it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XCalParams {
    /// Multiplier on the error-driven (medium threshold) term
    pub m_lrn: f32,
    /// Use the fixed `l_lrn` instead of the neuron's `avg_l_lrn`
    pub set_l_lrn: bool,
    /// Fixed multiplier on the BCM (long threshold) term
    pub l_lrn: f32,
    /// Reversal point as a proportion of the threshold
    pub d_rev: f32,
    /// Coproducts below this produce no change
    pub d_thr: f32,
    /// Senders with both `avg_s` and `avg_m` below this are skipped
    pub lrn_thr: f32,
    /// Proportion of the mean weight change subtracted per receiver, 0..1
    pub sub_mean: f32,
    /// Weight changes at or below this magnitude, scaled by lrate, are
    /// excluded from mean subtraction
    pub dwt_thr: f32,
}

impl Default for XCalParams {
    fn default() -> Self {
        Self {
            m_lrn: 1.0,
            set_l_lrn: true,
            l_lrn: 0.0,
            d_rev: 0.1,
            d_thr: 0.0001,
            lrn_thr: 0.01,
            sub_mean: 1.0,
            dwt_thr: 0.0001,
        }
    }
}

impl XCalParams {
    /// Slope of the negative ramp
    #[inline]
    pub fn d_rev_ratio(&self) -> f32 {
        if self.d_rev > 0.0 {
            -(1.0 - self.d_rev) / self.d_rev
        } else {
            -1.0
        }
    }

    /// XCAL weight change for coproduct `sr` against threshold `thr`
    ///
    /// # Example
    /// ```
    /// use synaptor_npu_plasticity::XCalParams;
    ///
    /// let x = XCalParams::default();
    /// assert_eq!(x.dwt(0.00001, 0.5), 0.0);              // below d_thr
    /// assert!((x.dwt(0.8, 0.5) - 0.3).abs() < 1e-6);     // above reversal
    /// assert!(x.dwt(0.02, 0.5) < 0.0);                   // negative ramp
    /// ```
    #[inline]
    pub fn dwt(&self, sr: f32, thr: f32) -> f32 {
        if sr < self.d_thr {
            0.0
        } else if sr > thr * self.d_rev {
            sr - thr
        } else {
            sr * self.d_rev_ratio()
        }
    }

    /// Learning rate multiplier for the BCM term
    #[inline]
    pub fn long_lrate(&self, avg_l_lrn: f32) -> f32 {
        if self.set_l_lrn {
            self.l_lrn
        } else {
            avg_l_lrn
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reversal_continuity() {
        // at sr = thr * d_rev both branches give thr * (d_rev - 1)
        let x = XCalParams::default();
        let thr = 0.5;
        let at = thr * x.d_rev;
        let below = x.dwt(at, thr);
        let expected = at - thr;
        assert!((below - expected).abs() < 1e-6);
    }

    #[test]
    fn test_zero_d_rev() {
        let x = XCalParams {
            d_rev: 0.0,
            ..Default::default()
        };
        assert_eq!(x.d_rev_ratio(), -1.0);
        assert!((x.dwt(0.3, 0.2) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_long_lrate() {
        let mut x = XCalParams::default();
        assert_eq!(x.long_lrate(0.3), 0.0);
        x.set_l_lrn = false;
        assert_eq!(x.long_lrate(0.3), 0.3);
    }
}
