// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Run configuration.
//!
//! A configuration is read from an optional JSON file in which every field may
//! be omitted; the command line then overrides individual values.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::error::FitsError;
use crate::error::Result;

/// Number of runs of a run-to-run test when its case does not set one.
pub const DEFAULT_R2R_RUNS: u32 = 5;

/// Absolute PSNR difference accepted when comparing against a baseline.
pub const DEFAULT_PSNR_TOLERANCE: f64 = 0.2;

/// Names of the external executables the suites drive.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Tools {
    pub ffmpeg: String,
    pub gst_launch: String,
    pub gst_inspect: String,
    pub vainfo: String,
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            gst_launch: "gst-launch-1.0".to_string(),
            gst_inspect: "gst-inspect-1.0".to_string(),
            vainfo: "vainfo".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Root of the JSON test specifications.
    pub spec_dir: PathBuf,
    /// Directory receiving output media and command logs.
    pub artifact_dir: PathBuf,
    /// Baseline store to compare against.
    pub baseline: Option<PathBuf>,
    /// When set, metrics are recorded into a new baseline written here
    /// instead of being compared.
    pub rebase_output: Option<PathBuf>,
    /// JSON results file.
    pub results: Option<PathBuf>,
    /// Platform tag of the device under test, e.g. "TGL".
    pub platform: Option<String>,
    pub r2r_runs: u32,
    pub psnr_tolerance: f64,
    /// Append the output of every external command to a log file in the
    /// artifact directory.
    pub command_logs: bool,
    pub tools: Tools,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spec_dir: PathBuf::from("specs"),
            artifact_dir: PathBuf::from("artifacts"),
            baseline: None,
            rebase_output: None,
            results: None,
            platform: None,
            r2r_runs: DEFAULT_R2R_RUNS,
            psnr_tolerance: DEFAULT_PSNR_TOLERANCE,
            command_logs: true,
            tools: Tools::default(),
        }
    }
}

impl Config {
    /// Reads the configuration at `path`, or returns the defaults when no
    /// path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    FitsError::Io(format!("Failed to read config {:?}: {}", path, e))
                })?;
                serde_json::from_str(&content).map_err(|e| FitsError::Parse {
                    file: path.to_path_buf(),
                    details: e.to_string(),
                })?
            }
            None => Config::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.r2r_runs < 2 {
            return Err(FitsError::Io(format!(
                "r2r_runs must be greater than 1, got {}",
                self.r2r_runs
            )));
        }
        if self.psnr_tolerance.is_nan() || self.psnr_tolerance <= 0.0 {
            return Err(FitsError::Io(format!(
                "psnr_tolerance must be positive, got {}",
                self.psnr_tolerance
            )));
        }
        Ok(())
    }

    pub fn rebase(&self) -> bool {
        self.rebase_output.is_some()
    }
}
