// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

/// Everything that can end a test instance early.
///
/// `Skip` is not a failure: it carries the reason an unmet precondition or an
/// unsupported format prevented the test from running. All other variants are
/// terminal failures for the instance they occur in.
#[derive(ThisError, Debug)]
pub enum FitsError {
    #[error("skipped: {0}")]
    Skip(String),
    #[error("command `{command}` failed with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },
    #[error("{channel} should be {expected} but was {actual}: {reason}")]
    NotPerfect {
        channel: &'static str,
        expected: f64,
        actual: f64,
        reason: &'static str,
    },
    #[error("{channel} out of baseline range: reference {reference}, actual {actual}, tolerance {tolerance}")]
    OutOfTolerance {
        channel: &'static str,
        reference: f64,
        actual: f64,
        tolerance: f64,
    },
    #[error("no baseline reference for {key} ({metric})")]
    BaselineMissing { key: String, metric: String },
    #[error("invalid baseline reference for {metric}: {value}")]
    InvalidBaseline { metric: String, value: String },
    #[error("r2r md5 mismatch on run {run}: reference {reference}, actual {actual}")]
    DigestMismatch {
        run: u32,
        reference: String,
        actual: String,
    },
    #[error("bitrate {actual:.2}kbps outside of [{min:.2}, {max:.2}]kbps")]
    BitrateOutOfRange { actual: f64, min: f64, max: f64 },
    #[error("invalid test spec {file:?}: {details}")]
    InvalidSpec { file: PathBuf, details: String },
    #[error("failed to parse {file:?}: {details}")]
    Parse { file: PathBuf, details: String },
    #[error("{0}")]
    Io(String),
}

impl FitsError {
    pub fn skip(reason: impl Into<String>) -> Self {
        FitsError::Skip(reason.into())
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, FitsError::Skip(_))
    }
}

pub type Result<T> = StdResult<T, FitsError>;
