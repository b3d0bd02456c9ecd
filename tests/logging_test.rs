// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0
//! Logging initialisation from configuration.

use synaptor::config::SynaptorConfig;
use synaptor::observability::CrateDebugFlags;

#[test]
fn test_init_logging_from_config() {
    let mut config = SynaptorConfig::default();
    config.logging.level = "warn".to_string();
    config.logging.debug_crates = vec!["synaptor-npu-projection".to_string()];

    let guard = synaptor::init_logging(&config, &CrateDebugFlags::default());
    assert!(guard.is_ok());

    // a second global subscriber is refused
    assert!(synaptor::init_logging(&config, &CrateDebugFlags::default()).is_err());
}
