// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */
//! Projection conductance scaling
//!
//! A projection's input is scaled so that receivers see roughly the same
//! drive regardless of how many senders they have. `Rel` sets the share of
//! a projection among all projections into the same receiving layer.

use serde::{Deserialize, Serialize};

/// Fraction of `Orig` below which adaptive scaling never goes
pub const GSCALE_FLOOR: f32 = 0.2;

/// Static scaling parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrjnScaleParams {
    /// Relative scale among projections into the same layer
    pub rel: f32,
    /// Absolute multiplier, not normalized
    pub abs: f32,
    /// Adapt `Scale` toward the relative target in slow adaptation
    pub adapt: bool,
    /// Learning rate for scale adaptation
    pub scale_lrate: f32,
    /// Tolerance above the target before scale is reduced
    pub hi_tol: f32,
    /// Tolerance below the target before scale is increased
    pub lo_tol: f32,
    /// Time constant of the running conductance averages, in cycles
    pub avg_tau: f32,
}

impl Default for PrjnScaleParams {
    fn default() -> Self {
        Self {
            rel: 1.0,
            abs: 1.0,
            adapt: false,
            scale_lrate: 0.5,
            hi_tol: 0.0,
            lo_tol: 0.8,
            avg_tau: 500.0,
        }
    }
}

impl PrjnScaleParams {
    /// Rate constant for the running averages
    #[inline]
    pub fn avg_dt(&self) -> f32 {
        if self.avg_tau > 0.0 {
            1.0 / self.avg_tau
        } else {
            1.0
        }
    }

    /// Scale that normalizes for the expected number of active senders
    ///
    /// # Arguments
    /// * `send_avg_act` - Expected fraction of active senders
    /// * `send_n` - Number of sending units
    /// * `n_con` - Average number of connections per receiver
    ///
    /// # Example
    /// ```
    /// use synaptor_npu_neural::synapse::PrjnScaleParams;
    ///
    /// let p = PrjnScaleParams::default();
    /// // Fully connected, 10 of 100 senders active
    /// assert!((p.sending_act_scale(0.1, 100.0, 100.0) - 0.1).abs() < 1e-6);
    /// ```
    pub fn sending_act_scale(&self, send_avg_act: f32, send_n: f32, n_con: f32) -> f32 {
        const SEM_EXTRA: i32 = 2;
        let n_con = n_con.max(1.0);
        let send_act_n = ((send_avg_act * send_n).round() as i32).max(1);
        let expected = if n_con == send_n {
            send_act_n
        } else {
            let max_act_n = (n_con as i32).min(send_act_n).max(1);
            let avg_act_n = ((send_avg_act * n_con).round() as i32).max(1);
            (avg_act_n + SEM_EXTRA).min(max_act_n)
        };
        1.0 / expected as f32
    }

    /// `abs × rel × sending_act_scale`
    #[inline]
    pub fn full_scale(&self, rel: f32, send_avg_act: f32, send_n: f32, n_con: f32) -> f32 {
        self.abs * rel * self.sending_act_scale(send_avg_act, send_n, n_con)
    }
}

/// Runtime scaling state and conductance statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GScaleVals {
    /// Scale applied to every weight on send
    pub scale: f32,
    /// `scale` as computed at initialization
    pub orig: f32,
    /// Normalized relative scale
    pub rel: f32,
    /// Observed share of `avg_max` among the receiver's projections
    pub avg_max_rel: f32,
    /// Last adaptation error
    pub err: f32,
    /// Average of nonzero delivered conductances, last cycle
    pub avg: f32,
    /// Max delivered conductance, last cycle
    pub max: f32,
    /// Running average of `avg`
    pub avg_avg: f32,
    /// Running average of `max`
    pub avg_max: f32,
}

impl Default for GScaleVals {
    fn default() -> Self {
        Self {
            scale: 1.0,
            orig: 1.0,
            rel: 1.0,
            avg_max_rel: 1.0,
            err: 0.0,
            avg: 0.0,
            max: 0.0,
            avg_avg: 0.0,
            avg_max: 0.0,
        }
    }
}

impl GScaleVals {
    /// Record the current scale as original and clear statistics
    pub fn init(&mut self) {
        self.orig = self.scale;
        self.avg_max_rel = self.rel;
        self.err = 0.0;
        self.avg = 0.0;
        self.max = 0.0;
        self.avg_avg = 0.0;
        self.avg_max = 0.0;
    }

    /// Fold one cycle's delivery statistics into the running averages
    ///
    /// Only called for cycles that delivered to at least one receiver.
    /// Each running average is seeded by its first sample.
    pub fn update_stats(&mut self, avg: f32, max: f32, avg_dt: f32) {
        self.avg = avg;
        if self.avg_avg == 0.0 {
            self.avg_avg = avg;
        } else {
            self.avg_avg += avg_dt * (avg - self.avg_avg);
        }
        self.max = max;
        if self.avg_max == 0.0 {
            self.avg_max = max;
        } else {
            self.avg_max += avg_dt * (max - self.avg_max);
        }
    }

    /// Move `scale` toward the relative target
    ///
    /// Returns true when the scale changed.
    pub fn adapt(&mut self, params: &PrjnScaleParams) -> bool {
        let err = self.rel - self.avg_max_rel;
        self.err = err;
        if err >= -params.hi_tol * self.rel && err <= params.lo_tol * self.rel {
            return false;
        }
        let floor = GSCALE_FLOOR * self.orig;
        self.scale = (self.scale + params.scale_lrate * self.orig * err).max(floor);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sending_act_scale_partial() {
        let p = PrjnScaleParams::default();
        // 100 senders, 20% active, 10 connections per receiver
        // avg_act_n = 2, +2 = 4, capped at min(10, 20) = 10
        assert!((p.sending_act_scale(0.2, 100.0, 10.0) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_sending_act_scale_min_one() {
        let p = PrjnScaleParams::default();
        assert_eq!(p.sending_act_scale(0.0, 10.0, 10.0), 1.0);
    }

    #[test]
    fn test_init_records_orig() {
        let mut g = GScaleVals {
            scale: 0.3,
            rel: 0.5,
            avg_max: 2.0,
            ..Default::default()
        };
        g.init();
        assert_eq!(g.orig, 0.3);
        assert_eq!(g.avg_max_rel, 0.5);
        assert_eq!(g.avg_max, 0.0);
    }

    #[test]
    fn test_update_stats_seeds_then_integrates() {
        let mut g = GScaleVals::default();
        g.update_stats(0.4, 0.8, 0.5);
        assert_eq!(g.avg_avg, 0.4);
        assert_eq!(g.avg_max, 0.8);
        g.update_stats(0.2, 0.6, 0.5);
        assert!((g.avg_avg - 0.3).abs() < 1e-6);
        assert!((g.avg_max - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_update_stats_seeds_each_average_separately() {
        let mut g = GScaleVals {
            avg_avg: 0.4,
            ..Default::default()
        };
        g.update_stats(0.2, 0.9, 0.5);
        assert!((g.avg_avg - 0.3).abs() < 1e-6);
        assert_eq!(g.avg_max, 0.9);
    }

    #[test]
    fn test_adapt_within_tolerance_is_noop() {
        let p = PrjnScaleParams::default();
        let mut g = GScaleVals {
            rel: 0.5,
            avg_max_rel: 0.3,
            ..Default::default()
        };
        assert!(!g.adapt(&p));
        assert_eq!(g.scale, 1.0);
    }

    #[test]
    fn test_adapt_reduces_overdriven_scale() {
        let p = PrjnScaleParams::default();
        let mut g = GScaleVals {
            rel: 0.5,
            avg_max_rel: 0.7,
            ..Default::default()
        };
        assert!(g.adapt(&p));
        assert!((g.scale - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_adapt_floor() {
        let p = PrjnScaleParams {
            scale_lrate: 10.0,
            ..Default::default()
        };
        let mut g = GScaleVals {
            rel: 0.1,
            avg_max_rel: 1.0,
            ..Default::default()
        };
        g.adapt(&p);
        assert!((g.scale - GSCALE_FLOOR).abs() < 1e-6);
    }
}
