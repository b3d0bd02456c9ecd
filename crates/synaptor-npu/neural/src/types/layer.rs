// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! Layer contract
//!
//! Projections hold no reference to their layers. The caller passes the
//! sending and receiving layer to each operation that needs them.

use super::neuron::Neuron;

/// What a projection needs from a layer
pub trait PrjnLayer: Sync {
    fn name(&self) -> &str;

    fn neurons(&self) -> &[Neuron];

    fn neurons_mut(&mut self) -> &mut [Neuron];

    /// Supervised output layer; slow adaptation is skipped for projections into it
    fn is_target(&self) -> bool {
        false
    }

    /// Unit count
    fn len(&self) -> usize {
        self.neurons().len()
    }

    fn is_empty(&self) -> bool {
        self.neurons().is_empty()
    }

    /// Mean of `avg_s` over all units; used as the sending activity estimate
    fn avg_act(&self) -> f32 {
        let ns = self.neurons();
        if ns.is_empty() {
            return 0.0;
        }
        ns.iter().map(|n| n.avg_s).sum::<f32>() / ns.len() as f32
    }
}

/// Plain vector-backed layer
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    pub neurons: Vec<Neuron>,
    pub target: bool,
}

impl Layer {
    pub fn new(name: impl Into<String>, n: usize) -> Self {
        Self {
            name: name.into(),
            neurons: vec![Neuron::default(); n],
            target: false,
        }
    }

    /// Mark as supervised target layer
    pub fn with_target(mut self, target: bool) -> Self {
        self.target = target;
        self
    }

    /// Reset conductance accumulators on every unit
    pub fn clear_g(&mut self) {
        self.neurons.iter_mut().for_each(Neuron::clear_g);
    }
}

impl PrjnLayer for Layer {
    fn name(&self) -> &str {
        &self.name
    }

    fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    fn neurons_mut(&mut self) -> &mut [Neuron] {
        &mut self.neurons
    }

    fn is_target(&self) -> bool {
        self.target
    }
}
