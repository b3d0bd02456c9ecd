// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! Error types for projection operations

use core::fmt;
use thiserror::Error;

/// A single weight-file entry that could not be applied
#[derive(Debug, Clone, PartialEq)]
pub enum WeightLoadIssue {
    /// The file names a synapse the connectivity table does not contain
    Unconnected { send: usize, recv: usize },
    /// `Si` and `Wt` arrays of a receiver record disagree in length
    LengthMismatch { recv: usize, si: usize, wt: usize },
    /// A metadata value could not be parsed
    BadMetaData { key: String, value: String },
}

impl fmt::Display for WeightLoadIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightLoadIssue::Unconnected { send, recv } => {
                write!(f, "no synapse from sending unit {} to receiving unit {}", send, recv)
            }
            WeightLoadIssue::LengthMismatch { recv, si, wt } => write!(
                f,
                "receiver {} lists {} sending indexes but {} weights",
                recv, si, wt
            ),
            WeightLoadIssue::BadMetaData { key, value } => {
                write!(f, "metadata {}: cannot parse {:?}", key, value)
            }
        }
    }
}

/// Errors raised by projection construction, access and weight I/O
#[derive(Debug, Error)]
pub enum PrjnError {
    /// Connectivity table is inconsistent or cannot be built
    #[error("Structure error: {0}")]
    Structure(String),

    /// Unknown synapse variable name
    #[error("Synapse variable named: {0} not found")]
    UnknownVariable(String),

    /// No synapse between the two units
    #[error("No synapse from sending unit {send} to receiving unit {recv}")]
    NotConnected { send: usize, recv: usize },

    /// Weight file applied with some entries rejected
    #[error("Weights partially applied: {} entries rejected", .0.len())]
    PartialApply(Vec<WeightLoadIssue>),

    /// Weight file could not be parsed
    #[error("Weight file format error: {0}")]
    WeightFormat(String),

    /// Parameter outside its valid range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for projection operations
pub type Result<T> = core::result::Result<T, PrjnError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_apply_message_counts_issues() {
        let err = PrjnError::PartialApply(vec![
            WeightLoadIssue::Unconnected { send: 1, recv: 2 },
            WeightLoadIssue::LengthMismatch { recv: 0, si: 3, wt: 2 },
        ]);
        assert_eq!(err.to_string(), "Weights partially applied: 2 entries rejected");
    }

    #[test]
    fn test_issue_display() {
        let issue = WeightLoadIssue::Unconnected { send: 4, recv: 7 };
        assert_eq!(
            issue.to_string(),
            "no synapse from sending unit 4 to receiving unit 7"
        );
    }

    #[test]
    fn test_io_error_converts() {
        fn fails() -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk"))?;
            Ok(())
        }
        assert!(matches!(fails(), Err(PrjnError::Io(_))));
    }
}
