// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */
//! Axonal delay line
//!
//! Each receiver owns `delay + 1` slots arranged as a ring. A send lands in
//! the slot `delay` positions ahead of the read head; each cycle the head
//! slot is drained into the receiver's conductance and the ring advances
//! by one.

use synaptor_npu_neural::synapse::compute_synaptic_contribution;
use synaptor_npu_neural::{Neuron, Synapse, SynapseType};

/// Ring index: zero position plus length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RingIdx {
    zi: usize,
    len: usize,
}

impl RingIdx {
    pub fn new(len: usize) -> Self {
        Self { zi: 0, len: len.max(1) }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current zero position
    #[inline]
    pub fn zi(&self) -> usize {
        self.zi
    }

    /// Physical slot of logical offset `i` from the head
    ///
    /// # Example
    /// ```
    /// use synaptor_npu_projection::RingIdx;
    ///
    /// let mut r = RingIdx::new(3);
    /// r.shift(2);
    /// assert_eq!(r.idx(0), 2);
    /// assert_eq!(r.idx(2), 1);
    /// ```
    #[inline]
    pub fn idx(&self, i: usize) -> usize {
        (self.zi + i) % self.len
    }

    /// Advance the head by `n`
    #[inline]
    pub fn shift(&mut self, n: usize) {
        self.zi = (self.zi + n) % self.len;
    }

    pub fn reset(&mut self) {
        self.zi = 0;
    }
}

/// Delivery statistics for one drained cycle
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DrainStats {
    /// Average over receivers with nonzero input
    pub avg: f32,
    pub max: f32,
    /// Receivers with nonzero input
    pub n: usize,
}

/// Per-receiver ring buffers of pending conductance
#[derive(Debug, Clone, PartialEq)]
pub struct DelayLine {
    ring: RingIdx,
    recv_n: usize,
    gbuf: Vec<f32>,
}

impl DelayLine {
    pub fn new(recv_n: usize, delay: usize) -> Self {
        let ring = RingIdx::new(delay + 1);
        Self {
            ring,
            recv_n,
            gbuf: vec![0.0; recv_n * ring.len()],
        }
    }

    #[inline]
    pub fn delay(&self) -> usize {
        self.ring.len() - 1
    }

    #[inline]
    pub fn recv_n(&self) -> usize {
        self.recv_n
    }

    pub fn ring(&self) -> RingIdx {
        self.ring
    }

    /// Zero all slots and rewind the ring
    pub fn reset(&mut self) {
        self.gbuf.iter_mut().for_each(|g| *g = 0.0);
        self.ring.reset();
    }

    /// Pending value `offset` cycles ahead of the head for receiver `ri`
    #[inline]
    pub fn pending(&self, ri: usize, offset: usize) -> f32 {
        self.gbuf[ri * self.ring.len() + self.ring.idx(offset)]
    }

    /// Sum over every pending slot
    pub fn pending_total(&self) -> f32 {
        self.gbuf.iter().sum()
    }

    /// Schedule `g` for receiver `ri` at the delay
    #[inline]
    pub fn add(&mut self, ri: usize, g: f32) {
        let slot = ri * self.ring.len() + self.ring.idx(self.delay());
        self.gbuf[slot] += g;
    }

    /// Schedule one sender's row
    ///
    /// `recv_idxs` and `syns` are the sender's aligned row.
    #[inline]
    pub fn send(&mut self, recv_idxs: &[u32], syns: &[Synapse], scale: f32) {
        debug_assert_eq!(recv_idxs.len(), syns.len());
        let len = self.ring.len();
        let off = self.ring.idx(self.delay());
        for (&ri, sy) in recv_idxs.iter().zip(syns) {
            self.gbuf[ri as usize * len + off] += compute_synaptic_contribution(scale, sy.wt);
        }
    }

    /// Deliver the head slot into `neurons`, clear it and advance the ring
    pub fn drain(&mut self, neurons: &mut [Neuron], syn_type: SynapseType) -> DrainStats {
        debug_assert_eq!(neurons.len(), self.recv_n);
        let len = self.ring.len();
        let head = self.ring.idx(0);
        let mut stats = DrainStats::default();
        let mut sum = 0.0;
        for (ri, nrn) in neurons.iter_mut().enumerate().take(self.recv_n) {
            let slot = &mut self.gbuf[ri * len + head];
            let g = *slot;
            *slot = 0.0;
            syn_type.add_g(nrn, g);
            if g > stats.max {
                stats.max = g;
            }
            if g > 0.0 {
                sum += g;
                stats.n += 1;
            }
        }
        if stats.n > 0 {
            stats.avg = sum / stats.n as f32;
        }
        self.ring.shift(1);
        stats
    }
}
