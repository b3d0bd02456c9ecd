// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */
//! Per-synapse state and named variable access

use serde::{Deserialize, Serialize};

/// State of a single synapse
///
/// `swt` is the structural weight in the adaptive variant and the fixed
/// per-synapse scale in the scaled variant.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Synapse {
    /// Effective weight used for transmission
    pub wt: f32,
    /// Linear learning weight in [0, 1]
    pub lwt: f32,
    /// Structural weight (adaptive) or scale (fixed)
    pub swt: f32,
    /// Pending weight change
    pub dwt: f32,
}

/// Named synapse variables, in stable index order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SynapseVar {
    Wt = 0,
    LWt = 1,
    SWt = 2,
    DWt = 3,
}

/// Variable names in index order
pub const SYNAPSE_VARS: [&str; 4] = ["Wt", "LWt", "SWt", "DWt"];

impl SynapseVar {
    pub const ALL: [SynapseVar; 4] = [
        SynapseVar::Wt,
        SynapseVar::LWt,
        SynapseVar::SWt,
        SynapseVar::DWt,
    ];

    /// Look up by name. `Scale` is accepted as an alias of `SWt`.
    ///
    /// # Example
    /// ```
    /// use synaptor_npu_neural::synapse::SynapseVar;
    ///
    /// assert_eq!(SynapseVar::from_name("LWt"), Some(SynapseVar::LWt));
    /// assert_eq!(SynapseVar::from_name("Scale"), Some(SynapseVar::SWt));
    /// assert_eq!(SynapseVar::from_name("Bogus"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Wt" => Some(SynapseVar::Wt),
            "LWt" => Some(SynapseVar::LWt),
            "SWt" | "Scale" => Some(SynapseVar::SWt),
            "DWt" => Some(SynapseVar::DWt),
            _ => None,
        }
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        SYNAPSE_VARS[self as usize]
    }
}

impl Synapse {
    #[inline]
    pub fn get(&self, var: SynapseVar) -> f32 {
        match var {
            SynapseVar::Wt => self.wt,
            SynapseVar::LWt => self.lwt,
            SynapseVar::SWt => self.swt,
            SynapseVar::DWt => self.dwt,
        }
    }

    #[inline]
    pub fn set(&mut self, var: SynapseVar, val: f32) {
        match var {
            SynapseVar::Wt => self.wt = val,
            SynapseVar::LWt => self.lwt = val,
            SynapseVar::SWt => self.swt = val,
            SynapseVar::DWt => self.dwt = val,
        }
    }

    /// Value by variable index; NaN when the index is out of range
    #[inline]
    pub fn var_by_index(&self, idx: usize) -> f32 {
        SynapseVar::from_index(idx).map_or(f32::NAN, |v| self.get(v))
    }

    /// Returns false when the index is out of range
    #[inline]
    pub fn set_var_by_index(&mut self, idx: usize, val: f32) -> bool {
        match SynapseVar::from_index(idx) {
            Some(v) => {
                self.set(v, val);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_and_indexes_agree() {
        for (i, name) in SYNAPSE_VARS.iter().enumerate() {
            let v = SynapseVar::from_name(name).unwrap();
            assert_eq!(v.index(), i);
            assert_eq!(v.name(), *name);
        }
    }

    #[test]
    fn test_var_by_index() {
        let mut sy = Synapse::default();
        assert!(sy.set_var_by_index(1, 0.25));
        assert_eq!(sy.lwt, 0.25);
        assert_eq!(sy.var_by_index(1), 0.25);
        assert!(sy.var_by_index(9).is_nan());
        assert!(!sy.set_var_by_index(9, 1.0));
    }
}
