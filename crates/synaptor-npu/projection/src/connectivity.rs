// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */
//! Connectivity table
//!
//! One synapse array stored sender-major, with a receiver-major index
//! pointing back into it:
//!
//! ```text
//! sender view    s_con_n[si], s_con_idx_st[si]  ->  s_con_idx[k] = ri,  synapse k
//! receiver view  r_con_n[ri], r_con_idx_st[ri]  ->  r_con_idx[j] = si,  r_syn_idx[j] = k
//! ```
//!
//! Both views are sorted ascending within each row.

use std::ops::Range;

use synaptor_npu_neural::{PrjnError, Result};

use crate::pattern::ConnectivityPattern;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectivityTable {
    send_n: usize,
    recv_n: usize,
    s_con_n: Vec<u32>,
    s_con_idx_st: Vec<u32>,
    s_con_idx: Vec<u32>,
    r_con_n: Vec<u32>,
    r_con_idx_st: Vec<u32>,
    r_con_idx: Vec<u32>,
    r_syn_idx: Vec<u32>,
}

impl ConnectivityTable {
    /// Build from a connectivity pattern
    ///
    /// # Errors
    ///
    /// `PrjnError::Structure` when the pattern fails, or connects nothing
    /// while it is [required](ConnectivityPattern::required).
    pub fn build(
        send_n: usize,
        recv_n: usize,
        pattern: &dyn ConnectivityPattern,
        same_layer: bool,
    ) -> Result<Self> {
        let pairs = pattern.connect(send_n, recv_n, same_layer)?;
        if pairs.is_empty() && pattern.required() {
            return Err(PrjnError::Structure(format!(
                "{} pattern made no connections for {}x{} layers",
                pattern.name(),
                send_n,
                recv_n
            )));
        }
        Self::from_pairs(send_n, recv_n, &pairs)
    }

    /// Build from `(send, recv)` pairs in any order
    ///
    /// Duplicate pairs collapse to one synapse.
    ///
    /// # Errors
    ///
    /// `PrjnError::Structure` when an index is outside its layer or the
    /// table would not fit 32-bit indexes.
    pub fn from_pairs(send_n: usize, recv_n: usize, pairs: &[(usize, usize)]) -> Result<Self> {
        if send_n > u32::MAX as usize || recv_n > u32::MAX as usize || pairs.len() > u32::MAX as usize {
            return Err(PrjnError::Structure(format!(
                "connectivity {}x{} with {} pairs exceeds 32-bit indexing",
                send_n,
                recv_n,
                pairs.len()
            )));
        }
        if let Some(&(si, ri)) = pairs.iter().find(|&&(si, ri)| si >= send_n || ri >= recv_n) {
            return Err(PrjnError::Structure(format!(
                "pair ({}, {}) outside layers of size {} and {}",
                si, ri, send_n, recv_n
            )));
        }

        let mut sorted = pairs.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        let n_syns = sorted.len();

        let mut s_con_n = vec![0u32; send_n];
        let mut r_con_n = vec![0u32; recv_n];
        for &(si, ri) in &sorted {
            s_con_n[si] += 1;
            r_con_n[ri] += 1;
        }
        let s_con_idx_st = prefix_starts(&s_con_n);
        let r_con_idx_st = prefix_starts(&r_con_n);

        let s_con_idx: Vec<u32> = sorted.iter().map(|&(_, ri)| ri as u32).collect();

        // Senders are visited in ascending order, so each receiver row fills sorted.
        let mut r_con_idx = vec![0u32; n_syns];
        let mut r_syn_idx = vec![0u32; n_syns];
        let mut cursor = r_con_idx_st.clone();
        for (k, &(si, ri)) in sorted.iter().enumerate() {
            let j = cursor[ri] as usize;
            r_con_idx[j] = si as u32;
            r_syn_idx[j] = k as u32;
            cursor[ri] += 1;
        }

        Ok(Self {
            send_n,
            recv_n,
            s_con_n,
            s_con_idx_st,
            s_con_idx,
            r_con_n,
            r_con_idx_st,
            r_con_idx,
            r_syn_idx,
        })
    }

    #[inline]
    pub fn send_n(&self) -> usize {
        self.send_n
    }

    #[inline]
    pub fn recv_n(&self) -> usize {
        self.recv_n
    }

    /// Total synapse count
    #[inline]
    pub fn n_syns(&self) -> usize {
        self.s_con_idx.len()
    }

    #[inline]
    pub fn s_con_n(&self) -> &[u32] {
        &self.s_con_n
    }

    #[inline]
    pub fn r_con_n(&self) -> &[u32] {
        &self.r_con_n
    }

    /// Receiver of every synapse, in synapse order
    #[inline]
    pub fn s_con_idx(&self) -> &[u32] {
        &self.s_con_idx
    }

    /// Synapse range of a sender's row
    #[inline]
    pub fn send_range(&self, si: usize) -> Range<usize> {
        let st = self.s_con_idx_st[si] as usize;
        st..st + self.s_con_n[si] as usize
    }

    /// Receivers of a sender, ascending
    #[inline]
    pub fn send_recv_idxs(&self, si: usize) -> &[u32] {
        &self.s_con_idx[self.send_range(si)]
    }

    /// Range of a receiver's row in the receiver view
    #[inline]
    pub fn recv_range(&self, ri: usize) -> Range<usize> {
        let st = self.r_con_idx_st[ri] as usize;
        st..st + self.r_con_n[ri] as usize
    }

    /// Senders of a receiver, ascending
    #[inline]
    pub fn recv_send_idxs(&self, ri: usize) -> &[u32] {
        &self.r_con_idx[self.recv_range(ri)]
    }

    /// Synapse indexes of a receiver, aligned with [`Self::recv_send_idxs`]
    #[inline]
    pub fn recv_syn_idxs(&self, ri: usize) -> &[u32] {
        &self.r_syn_idx[self.recv_range(ri)]
    }

    /// Synapse index connecting `si` to `ri`
    ///
    /// Searches the sender's sorted row. `None` when either index is out of
    /// range or the pair is not connected.
    pub fn find_synapse(&self, si: usize, ri: usize) -> Option<usize> {
        if si >= self.send_n || ri >= self.recv_n {
            return None;
        }
        let range = self.send_range(si);
        let row = &self.s_con_idx[range.clone()];
        row.binary_search(&(ri as u32)).ok().map(|off| range.start + off)
    }

    /// Synapse index connecting `si` to `ri`, searching outward from an
    /// interpolated start
    ///
    /// Receivers outside the row's first..=last span are rejected without a
    /// scan. Otherwise the scan starts at the offset proportional to `ri`
    /// within that span and walks up and down together, which finds rows
    /// with near-uniform spacing in a step or two.
    pub fn locate_synapse(&self, si: usize, ri: usize) -> Option<usize> {
        if si >= self.send_n {
            return None;
        }
        let range = self.send_range(si);
        let row = &self.s_con_idx[range.clone()];
        let (&first, &last) = (row.first()?, row.last()?);
        let target = ri as u32;
        if target < first || target > last {
            return None;
        }
        let nc = row.len();
        let mut up = if last > first {
            ((nc as f32 * (target - first) as f32 / (last - first) as f32) as usize).min(nc)
        } else {
            0
        };
        let mut dn = up.checked_sub(1);
        loop {
            let mut moved = false;
            if up < nc {
                if row[up] == target {
                    return Some(range.start + up);
                }
                up += 1;
                moved = true;
            }
            if let Some(d) = dn {
                if row[d] == target {
                    return Some(range.start + d);
                }
                dn = d.checked_sub(1);
                moved = true;
            }
            if !moved {
                return None;
            }
        }
    }

    /// Average connections per receiver
    pub fn avg_recv_con(&self) -> f32 {
        if self.recv_n == 0 {
            return 0.0;
        }
        self.n_syns() as f32 / self.recv_n as f32
    }

    /// Largest receiver row
    pub fn max_recv_con(&self) -> usize {
        self.r_con_n.iter().copied().max().unwrap_or(0) as usize
    }

    /// Check every structural invariant of the table
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(PrjnError::Structure(msg));
        let n = self.n_syns();

        if self.s_con_n.len() != self.send_n || self.s_con_idx_st.len() != self.send_n {
            return fail("sender view length differs from sender count".into());
        }
        if self.r_con_n.len() != self.recv_n || self.r_con_idx_st.len() != self.recv_n {
            return fail("receiver view length differs from receiver count".into());
        }
        if self.r_con_idx.len() != n || self.r_syn_idx.len() != n {
            return fail(format!(
                "receiver view holds {} entries, sender view {}",
                self.r_con_idx.len(),
                n
            ));
        }
        let s_total: u64 = self.s_con_n.iter().map(|&c| c as u64).sum();
        let r_total: u64 = self.r_con_n.iter().map(|&c| c as u64).sum();
        if s_total != n as u64 || r_total != n as u64 {
            return fail(format!(
                "row counts sum to {} (send) and {} (recv), expected {}",
                s_total, r_total, n
            ));
        }
        if self.s_con_idx_st != prefix_starts(&self.s_con_n)
            || self.r_con_idx_st != prefix_starts(&self.r_con_n)
        {
            return fail("row starts are not the prefix sums of row counts".into());
        }

        let mut seen = vec![false; n];
        for ri in 0..self.recv_n {
            let sends = self.recv_send_idxs(ri);
            let syns = self.recv_syn_idxs(ri);
            if sends.windows(2).any(|w| w[0] >= w[1]) {
                return fail(format!("receiver {} row is not strictly ascending", ri));
            }
            for (&si, &k) in sends.iter().zip(syns) {
                let k = k as usize;
                if k >= n || seen[k] {
                    return fail(format!("synapse index {} repeated or out of range", k));
                }
                seen[k] = true;
                if si as usize >= self.send_n || !self.send_range(si as usize).contains(&k) {
                    return fail(format!("synapse {} is not in sender {}'s row", k, si));
                }
                if self.s_con_idx[k] as usize != ri {
                    return fail(format!("synapse {} does not point to receiver {}", k, ri));
                }
            }
        }
        for si in 0..self.send_n {
            let row = self.send_recv_idxs(si);
            if row.windows(2).any(|w| w[0] >= w[1]) {
                return fail(format!("sender {} row is not strictly ascending", si));
            }
        }
        Ok(())
    }
}

fn prefix_starts(counts: &[u32]) -> Vec<u32> {
    let mut st = Vec::with_capacity(counts.len());
    let mut acc = 0u32;
    for &c in counts {
        st.push(acc);
        acc += c;
    }
    st
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Full;
    use proptest::prelude::*;

    #[test]
    fn test_full_table_views() {
        let t = ConnectivityTable::build(3, 2, &Full::default(), false).unwrap();
        assert_eq!(t.n_syns(), 6);
        assert_eq!(t.send_recv_idxs(1), &[0, 1]);
        assert_eq!(t.recv_send_idxs(1), &[0, 1, 2]);
        assert_eq!(t.recv_syn_idxs(1), &[1, 3, 5]);
        t.validate().unwrap();
    }

    #[test]
    fn test_find_synapse() {
        let t = ConnectivityTable::from_pairs(3, 3, &[(0, 2), (2, 0), (0, 0)]).unwrap();
        assert_eq!(t.find_synapse(0, 0), Some(0));
        assert_eq!(t.find_synapse(0, 2), Some(1));
        assert_eq!(t.find_synapse(2, 0), Some(2));
        assert_eq!(t.find_synapse(1, 1), None);
        assert_eq!(t.find_synapse(5, 0), None);
    }

    #[test]
    fn test_locate_synapse() {
        let t = ConnectivityTable::from_pairs(2, 10, &[(0, 1), (0, 4), (0, 5), (0, 9), (1, 3)]).unwrap();
        assert_eq!(t.locate_synapse(0, 1), Some(0));
        assert_eq!(t.locate_synapse(0, 5), Some(2));
        assert_eq!(t.locate_synapse(0, 9), Some(3));
        assert_eq!(t.locate_synapse(0, 6), None);
        // outside the row's span
        assert_eq!(t.locate_synapse(0, 0), None);
        assert_eq!(t.locate_synapse(1, 3), Some(4));
        assert_eq!(t.locate_synapse(1, 2), None);
        assert_eq!(t.locate_synapse(3, 0), None);
    }

    #[test]
    fn test_out_of_range_pair_is_structure_error() {
        let err = ConnectivityTable::from_pairs(2, 2, &[(0, 2)]).unwrap_err();
        assert!(matches!(err, PrjnError::Structure(_)));
    }

    #[test]
    fn test_duplicates_collapse() {
        let t = ConnectivityTable::from_pairs(2, 2, &[(1, 1), (1, 1), (0, 1)]).unwrap();
        assert_eq!(t.n_syns(), 2);
        assert_eq!(t.r_con_n(), &[0, 2]);
    }

    #[test]
    fn test_empty_rows() {
        let t = ConnectivityTable::from_pairs(4, 4, &[(3, 0)]).unwrap();
        assert_eq!(t.send_range(0), 0..0);
        assert!(t.recv_send_idxs(2).is_empty());
        assert_eq!(t.max_recv_con(), 1);
        t.validate().unwrap();
    }

    #[test]
    fn test_validate_detects_corruption() {
        let mut t = ConnectivityTable::build(2, 2, &Full::default(), false).unwrap();
        t.r_syn_idx.swap(0, 1);
        assert!(t.validate().is_err());
    }

    proptest! {
        #[test]
        fn prop_views_agree(
            send_n in 1usize..12,
            recv_n in 1usize..12,
            raw in proptest::collection::vec((0usize..12, 0usize..12), 0..80),
        ) {
            let pairs: Vec<_> = raw
                .into_iter()
                .map(|(s, r)| (s % send_n, r % recv_n))
                .collect();
            let t = ConnectivityTable::from_pairs(send_n, recv_n, &pairs).unwrap();
            prop_assert!(t.validate().is_ok());
            for &(si, ri) in &pairs {
                let k = t.find_synapse(si, ri);
                prop_assert!(k.is_some());
                prop_assert_eq!(t.s_con_idx()[k.unwrap()] as usize, ri);
            }
        }

        #[test]
        fn prop_locate_matches_search(
            send_n in 1usize..12,
            recv_n in 1usize..40,
            raw in proptest::collection::vec((0usize..12, 0usize..40), 0..120),
        ) {
            let pairs: Vec<_> = raw
                .into_iter()
                .map(|(s, r)| (s % send_n, r % recv_n))
                .collect();
            let t = ConnectivityTable::from_pairs(send_n, recv_n, &pairs).unwrap();
            for si in 0..send_n {
                for ri in 0..recv_n + 2 {
                    prop_assert_eq!(t.locate_synapse(si, ri), t.find_synapse(si, ri));
                }
            }
        }
    }
}
