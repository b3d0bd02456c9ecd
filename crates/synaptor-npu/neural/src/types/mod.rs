// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! Core type definitions for projections

pub mod error;
pub mod layer;
pub mod neuron;

pub use error::*;
pub use layer::*;
pub use neuron::*;
