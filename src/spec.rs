// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Declarative test specifications.
//!
//! A specification file maps a case name to the fixed attributes of its
//! source media. Files live at `<spec_dir>/<category>/<name>.json`, and
//! alternative sets of cases for the same test at
//! `<spec_dir>/<category>/<name>.<variant>.json`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::FitsError;
use crate::error::Result;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CqpVariant {
    pub gop: u32,
    pub slices: u32,
    pub bframes: u32,
    pub qp: u32,
    pub quality: u32,
    pub profile: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CqpLpVariant {
    pub gop: u32,
    pub slices: u32,
    pub qp: u32,
    pub quality: u32,
    pub profile: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CbrVariant {
    pub gop: u32,
    pub slices: u32,
    pub bframes: u32,
    pub bitrate: u32,
    pub fps: u32,
    pub profile: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct VbrVariant {
    pub gop: u32,
    pub slices: u32,
    pub bframes: u32,
    pub bitrate: u32,
    pub fps: u32,
    pub quality: u32,
    pub refs: u32,
    pub profile: Option<String>,
}

/// Per rate-control mode overrides of the default encoder variants.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EncodeVariants {
    pub cqp: Option<Vec<CqpVariant>>,
    pub cqp_lp: Option<Vec<CqpLpVariant>>,
    pub cbr: Option<Vec<CbrVariant>>,
    pub vbr: Option<Vec<VbrVariant>>,
}

/// Fixed attributes of one test case.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CaseSpec {
    pub source: PathBuf,
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub frames: u32,
    pub fps: Option<u32>,
    /// Saturation levels to exercise, 0-100.
    pub levels: Option<Vec<u32>>,
    /// Number of runs of a run-to-run test.
    pub r2r: Option<u32>,
    /// Extra keys distinguishing this case's baseline records.
    #[serde(default)]
    pub refctx: Vec<String>,
    #[serde(default)]
    pub variants: EncodeVariants,
}

/// All cases of one specification, ordered by case name.
pub type TestSpec = BTreeMap<String, CaseSpec>;

/// Path of the specification file for `(category, name, variant)`.
pub fn spec_path(spec_dir: &Path, category: &str, name: &str, variant: Option<&str>) -> PathBuf {
    let file_name = match variant {
        Some(variant) => format!("{}.{}.json", name, variant),
        None => format!("{}.json", name),
    };
    spec_dir.join(category).join(file_name)
}

/// Loads and validates a test specification.
pub fn load_test_spec(
    spec_dir: &Path,
    category: &str,
    name: &str,
    variant: Option<&str>,
) -> Result<TestSpec> {
    let path = spec_path(spec_dir, category, name, variant);
    let content = fs::read_to_string(&path)
        .map_err(|e| FitsError::Io(format!("Failed to read test spec {:?}: {}", path, e)))?;
    let mut spec: TestSpec = serde_json::from_str(&content).map_err(|e| FitsError::InvalidSpec {
        file: path.clone(),
        details: e.to_string(),
    })?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    for (case, params) in spec.iter_mut() {
        validate_case(case, params).map_err(|details| FitsError::InvalidSpec {
            file: path.clone(),
            details,
        })?;
        if params.source.is_relative() {
            params.source = base_dir.join(&params.source);
        }
    }

    log::debug!("Loaded {} cases from {:?}", spec.len(), path);
    Ok(spec)
}

fn validate_case(case: &str, params: &CaseSpec) -> std::result::Result<(), String> {
    if params.source.as_os_str().is_empty() {
        return Err(format!("{}: empty source", case));
    }
    if params.width == 0 || params.height == 0 {
        return Err(format!("{}: invalid size {}x{}", case, params.width, params.height));
    }
    if params.frames == 0 {
        return Err(format!("{}: frames must be positive", case));
    }
    if params.levels.as_ref().is_some_and(Vec::is_empty) {
        return Err(format!("{}: empty levels", case));
    }
    if let Some(level) = params.levels.iter().flatten().find(|&&level| level > 100) {
        return Err(format!("{}: level {} outside of 0-100", case, level));
    }
    if let Some(r2r) = params.r2r {
        if r2r < 2 {
            return Err(format!("{}: r2r must be greater than 1, got {}", case, r2r));
        }
    }
    validate_variants(case, &params.variants)
}

// Slices, bitrate and fps of every encoder variant must be positive.
fn validate_variants(case: &str, variants: &EncodeVariants) -> std::result::Result<(), String> {
    let positive = |mode: &str, index: usize, field: &str, value: u32| {
        if value == 0 {
            Err(format!("{}: {} variant {} has zero {}", case, mode, index, field))
        } else {
            Ok(())
        }
    };
    for (i, v) in variants.cqp.iter().flatten().enumerate() {
        positive("cqp", i, "slices", v.slices)?;
    }
    for (i, v) in variants.cqp_lp.iter().flatten().enumerate() {
        positive("cqp_lp", i, "slices", v.slices)?;
    }
    for (i, v) in variants.cbr.iter().flatten().enumerate() {
        positive("cbr", i, "slices", v.slices)?;
        positive("cbr", i, "bitrate", v.bitrate)?;
        positive("cbr", i, "fps", v.fps)?;
    }
    for (i, v) in variants.vbr.iter().flatten().enumerate() {
        positive("vbr", i, "slices", v.slices)?;
        positive("vbr", i, "bitrate", v.bitrate)?;
        positive("vbr", i, "fps", v.fps)?;
    }
    Ok(())
}
