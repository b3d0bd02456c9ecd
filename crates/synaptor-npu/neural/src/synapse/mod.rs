// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */
//! Synaptic computation module
//!
//! Synapse state plus the pure functions projections apply to it.

pub mod com;
pub mod contribution;
pub mod scale;
pub mod state;
pub mod weight;

pub use com::*;
pub use contribution::*;
pub use scale::*;
pub use state::*;
pub use weight::*;
