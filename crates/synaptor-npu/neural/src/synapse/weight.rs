// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */
//! Sigmoidal weight contrast transform
//!
//! Learning operates on a linear weight in [0, 1]; transmission uses a
//! contrast-enhanced version of it:
//!
//! `sig(w) = 1 / (1 + (off * (1 - w) / w) ^ gain)`
//!
//! Computation is carried out in `f64` so that the inverse stays accurate
//! near saturation. The `f32` entry points round once at the end.

use serde::{Deserialize, Serialize};

/// Sigmoidal contrast function
///
/// Returns 0 for `w <= 0` and 1 for `w >= 1`.
///
/// # Example
/// ```
/// use synaptor_npu_neural::synapse::sig_fun;
///
/// assert_eq!(sig_fun(0.0, 6.0, 1.0), 0.0);
/// assert_eq!(sig_fun(1.0, 6.0, 1.0), 1.0);
/// assert!((sig_fun(0.5, 6.0, 1.0) - 0.5).abs() < 1e-12);
/// ```
#[inline]
pub fn sig_fun(w: f64, gain: f64, off: f64) -> f64 {
    if w <= 0.0 {
        return 0.0;
    }
    if w >= 1.0 {
        return 1.0;
    }
    1.0 / (1.0 + ((off * (1.0 - w)) / w).powf(gain))
}

/// Specialization of [`sig_fun`] for gain 6, offset 1
#[inline]
pub fn sig_fun_61(w: f64) -> f64 {
    if w <= 0.0 {
        return 0.0;
    }
    if w >= 1.0 {
        return 1.0;
    }
    let pwguts = (1.0 - w) / w;
    1.0 / (1.0 + pwguts.powi(6))
}

/// Inverse of [`sig_fun`]
///
/// # Example
/// ```
/// use synaptor_npu_neural::synapse::{sig_fun, sig_inv_fun};
///
/// let w = 0.3;
/// assert!((sig_inv_fun(sig_fun(w, 3.0, 1.2), 3.0, 1.2) - w).abs() < 1e-9);
/// ```
#[inline]
pub fn sig_inv_fun(w: f64, gain: f64, off: f64) -> f64 {
    if w <= 0.0 {
        return 0.0;
    }
    if w >= 1.0 {
        return 1.0;
    }
    1.0 / (1.0 + ((1.0 - w) / w).powf(1.0 / gain) / off)
}

/// Specialization of [`sig_inv_fun`] for gain 6, offset 1
#[inline]
pub fn sig_inv_fun_61(w: f64) -> f64 {
    if w <= 0.0 {
        return 0.0;
    }
    if w >= 1.0 {
        return 1.0;
    }
    1.0 / (1.0 + ((1.0 - w) / w).powf(1.0 / 6.0))
}

/// Weight contrast parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WtSigParams {
    /// Contrast gain; 1 is linear
    pub gain: f32,
    /// Offset; values above 1 shift the curve toward lower weights
    pub off: f32,
}

impl Default for WtSigParams {
    fn default() -> Self {
        Self { gain: 6.0, off: 1.0 }
    }
}

impl WtSigParams {
    #[inline]
    fn is_identity(&self) -> bool {
        self.gain == 1.0 && self.off == 1.0
    }

    #[inline]
    fn is_61(&self) -> bool {
        self.gain == 6.0 && self.off == 1.0
    }

    /// Sigmoidal weight from linear weight
    #[inline]
    pub fn sig_fm_lin_wt_f64(&self, lw: f64) -> f64 {
        if self.is_identity() {
            lw
        } else if self.is_61() {
            sig_fun_61(lw)
        } else {
            sig_fun(lw, self.gain as f64, self.off as f64)
        }
    }

    /// Linear weight from sigmoidal weight
    #[inline]
    pub fn lin_fm_sig_wt_f64(&self, sw: f64) -> f64 {
        if self.is_identity() {
            sw
        } else if self.is_61() {
            sig_inv_fun_61(sw)
        } else {
            sig_inv_fun(sw, self.gain as f64, self.off as f64)
        }
    }

    /// Sigmoidal weight from linear weight
    ///
    /// # Example
    /// ```
    /// use synaptor_npu_neural::synapse::WtSigParams;
    ///
    /// let p = WtSigParams::default();
    /// assert_eq!(p.sig_fm_lin_wt(0.5), 0.5);
    /// assert!(p.sig_fm_lin_wt(0.6) > 0.6); // contrast enhanced
    /// ```
    ///
    /// The result is rounded to `f32`. With the default gain the curve comes
    /// within `f32` spacing of 1 as `lw` passes about 0.9, so
    /// [`lin_fm_sig_wt`](Self::lin_fm_sig_wt) recovers such inputs only
    /// coarsely, and from about 0.95 the weight is exactly 1. Use the `_f64`
    /// pair where the round trip must hold across the whole open interval.
    #[inline]
    pub fn sig_fm_lin_wt(&self, lw: f32) -> f32 {
        self.sig_fm_lin_wt_f64(lw as f64) as f32
    }

    /// Linear weight from sigmoidal weight
    ///
    /// `f32` inverse of [`sig_fm_lin_wt`](Self::sig_fm_lin_wt); a saturated
    /// weight of exactly 0 or 1 maps back to 0 or 1.
    #[inline]
    pub fn lin_fm_sig_wt(&self, sw: f32) -> f32 {
        self.lin_fm_sig_wt_f64(sw as f64) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sig_fun_bounds() {
        assert_eq!(sig_fun(-0.1, 6.0, 1.0), 0.0);
        assert_eq!(sig_fun(1.2, 6.0, 1.0), 1.0);
        assert_eq!(sig_inv_fun(0.0, 6.0, 1.0), 0.0);
        assert_eq!(sig_inv_fun(1.0, 6.0, 1.0), 1.0);
    }

    #[test]
    fn test_specialization_matches_general() {
        for i in 1..100 {
            let w = i as f64 / 100.0;
            assert!((sig_fun_61(w) - sig_fun(w, 6.0, 1.0)).abs() < 1e-12);
            assert!((sig_inv_fun_61(w) - sig_inv_fun(w, 6.0, 1.0)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_identity_fast_path() {
        let p = WtSigParams { gain: 1.0, off: 1.0 };
        assert_eq!(p.sig_fm_lin_wt(0.37), 0.37);
        assert_eq!(p.lin_fm_sig_wt(0.37), 0.37);
    }

    #[test]
    fn test_monotone() {
        let p = WtSigParams::default();
        let mut prev = 0.0;
        for i in 1..=100 {
            let v = p.sig_fm_lin_wt(i as f32 / 100.0);
            assert!(v >= prev);
            prev = v;
        }
    }

    #[test]
    fn test_f32_round_trip_mid_range_and_saturation() {
        let p = WtSigParams::default();
        for i in 30..=70 {
            let x = i as f32 / 100.0;
            assert!((p.lin_fm_sig_wt(p.sig_fm_lin_wt(x)) - x).abs() < 1e-4);
        }
        assert_eq!(p.sig_fm_lin_wt(0.95), 1.0);
        assert_eq!(p.lin_fm_sig_wt(p.sig_fm_lin_wt(0.95)), 1.0);
        let back = p.lin_fm_sig_wt_f64(p.sig_fm_lin_wt_f64(0.95));
        assert!((back - 0.95).abs() < 1e-5);
    }

    proptest! {
        #[test]
        fn prop_round_trip_gain6(x in 0.01f64..0.99) {
            let p = WtSigParams::default();
            let back = p.lin_fm_sig_wt_f64(p.sig_fm_lin_wt_f64(x));
            prop_assert!((back - x).abs() < 1e-5);
        }

        #[test]
        fn prop_round_trip_general(x in 0.01f64..0.99, gain in 1.0f32..4.0, off in 0.8f32..1.5) {
            let p = WtSigParams { gain, off };
            let back = p.lin_fm_sig_wt_f64(p.sig_fm_lin_wt_f64(x));
            prop_assert!((back - x).abs() < 1e-5);
        }

        #[test]
        fn prop_round_trip_f32_midrange(x in 0.2f32..0.8) {
            let p = WtSigParams::default();
            let back = p.lin_fm_sig_wt(p.sig_fm_lin_wt(x));
            prop_assert!((back - x).abs() < 1e-4);
        }
    }
}
