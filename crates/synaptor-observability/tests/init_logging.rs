// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */
//! Subscriber installation test
//!
//! Lives in its own test binary because the subscriber is process-global.

use synaptor_observability::{init_logging, CrateDebugFlags, LogFormat, LoggingConfig};

#[test]
fn test_init_once_then_reject_second() {
    let flags = CrateDebugFlags::from_names(["synaptor-npu-projection"]);
    let config = LoggingConfig {
        format: LogFormat::Json,
        ..Default::default()
    };
    let _guard = init_logging(&flags, &config).expect("first init succeeds");
    tracing::info!("logging is up");
    assert!(init_logging(&flags, &config).is_err());
}
