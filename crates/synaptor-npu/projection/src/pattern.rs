// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */
//! Connectivity patterns
//!
//! A pattern decides which `(send, recv)` pairs get a synapse. The table
//! builder sorts and deduplicates, so patterns may emit pairs in any order.

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::SeedableRng;
use synaptor_npu_neural::{PrjnError, Result};

pub trait ConnectivityPattern: Send + Sync {
    fn name(&self) -> &str;

    /// Pairs to connect
    ///
    /// `same_layer` is true when sender and receiver are the same layer.
    fn connect(&self, send_n: usize, recv_n: usize, same_layer: bool) -> Result<Vec<(usize, usize)>>;

    /// Whether an empty pair list is a structure error
    fn required(&self) -> bool {
        true
    }
}

/// Every sender to every receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Full {
    /// Connect a unit to itself in same-layer projections
    pub self_con: bool,
}

impl Default for Full {
    fn default() -> Self {
        Self { self_con: true }
    }
}

impl ConnectivityPattern for Full {
    fn name(&self) -> &str {
        "Full"
    }

    fn connect(&self, send_n: usize, recv_n: usize, same_layer: bool) -> Result<Vec<(usize, usize)>> {
        let skip_self = same_layer && !self.self_con;
        let mut pairs = Vec::with_capacity(send_n * recv_n);
        for si in 0..send_n {
            for ri in 0..recv_n {
                if skip_self && si == ri {
                    continue;
                }
                pairs.push((si, ri));
            }
        }
        Ok(pairs)
    }
}

/// Unit `i` to unit `i`; layers must be the same size
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OneToOne;

impl ConnectivityPattern for OneToOne {
    fn name(&self) -> &str {
        "OneToOne"
    }

    fn connect(&self, send_n: usize, recv_n: usize, _same_layer: bool) -> Result<Vec<(usize, usize)>> {
        if send_n != recv_n {
            return Err(PrjnError::Structure(format!(
                "OneToOne needs equal layer sizes, got {} senders and {} receivers",
                send_n, recv_n
            )));
        }
        Ok((0..send_n).map(|i| (i, i)).collect())
    }
}

/// Each receiver draws `round(p_con × send_n)` distinct senders
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformRandom {
    pub p_con: f32,
    pub seed: u64,
    pub self_con: bool,
    /// Reject draws that connect nothing
    pub required: bool,
}

impl UniformRandom {
    pub fn new(p_con: f32, seed: u64) -> Self {
        Self {
            p_con,
            seed,
            self_con: true,
            required: true,
        }
    }

    /// Accept an empty draw
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

impl ConnectivityPattern for UniformRandom {
    fn name(&self) -> &str {
        "UniformRandom"
    }

    fn connect(&self, send_n: usize, recv_n: usize, same_layer: bool) -> Result<Vec<(usize, usize)>> {
        if !(0.0..=1.0).contains(&self.p_con) {
            return Err(PrjnError::Structure(format!(
                "UniformRandom p_con {} outside [0, 1]",
                self.p_con
            )));
        }
        let skip_self = same_layer && !self.self_con;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut pairs = Vec::new();
        for ri in 0..recv_n {
            let pool: Vec<usize> = (0..send_n).filter(|&si| !(skip_self && si == ri)).collect();
            let n = ((self.p_con * pool.len() as f32).round() as usize).min(pool.len());
            for j in sample(&mut rng, pool.len(), n).into_iter() {
                pairs.push((pool[j], ri));
            }
        }
        Ok(pairs)
    }

    fn required(&self) -> bool {
        self.required
    }
}

/// Caller-supplied pair list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplicitPattern {
    pub pairs: Vec<(usize, usize)>,
    pub required: bool,
}

impl ExplicitPattern {
    pub fn new(pairs: Vec<(usize, usize)>) -> Self {
        Self { pairs, required: true }
    }

    /// Accept an empty pair list
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

impl ConnectivityPattern for ExplicitPattern {
    fn name(&self) -> &str {
        "Explicit"
    }

    fn connect(&self, _send_n: usize, _recv_n: usize, _same_layer: bool) -> Result<Vec<(usize, usize)>> {
        Ok(self.pairs.clone())
    }

    fn required(&self) -> bool {
        self.required
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::ConnectivityTable;

    #[test]
    fn test_full_without_self() {
        let pairs = Full { self_con: false }.connect(3, 3, true).unwrap();
        assert_eq!(pairs.len(), 6);
        assert!(pairs.iter().all(|&(s, r)| s != r));
        // self connections only excluded for same-layer projections
        assert_eq!(Full { self_con: false }.connect(3, 3, false).unwrap().len(), 9);
    }

    #[test]
    fn test_one_to_one_size_mismatch() {
        assert!(matches!(
            OneToOne.connect(3, 4, false),
            Err(PrjnError::Structure(_))
        ));
        assert_eq!(OneToOne.connect(2, 2, false).unwrap(), vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn test_uniform_random_counts_per_receiver() {
        let pat = UniformRandom::new(0.5, 7);
        let t = ConnectivityTable::build(10, 6, &pat, false).unwrap();
        assert!(t.r_con_n().iter().all(|&n| n == 5));
        t.validate().unwrap();
    }

    #[test]
    fn test_uniform_random_is_seeded() {
        let a = UniformRandom::new(0.3, 11).connect(20, 5, false).unwrap();
        let b = UniformRandom::new(0.3, 11).connect(20, 5, false).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_uniform_random_rejects_bad_probability() {
        assert!(UniformRandom::new(1.5, 0).connect(2, 2, false).is_err());
    }

    #[test]
    fn test_empty_pattern_is_structure_error() {
        let err = ConnectivityTable::build(5, 5, &UniformRandom::new(0.0, 3), false).unwrap_err();
        assert!(matches!(err, PrjnError::Structure(_)));
        let err = ConnectivityTable::build(2, 2, &ExplicitPattern::new(vec![]), false).unwrap_err();
        assert!(matches!(err, PrjnError::Structure(_)));
    }

    #[test]
    fn test_optional_pattern_may_be_empty() {
        let t = ConnectivityTable::build(5, 5, &UniformRandom::new(0.0, 3).optional(), false).unwrap();
        assert_eq!(t.n_syns(), 0);
        t.validate().unwrap();
        let t = ConnectivityTable::build(2, 2, &ExplicitPattern::new(vec![]).optional(), false).unwrap();
        assert_eq!(t.n_syns(), 0);
    }
}
