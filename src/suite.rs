// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Enumeration of every test instance of the enabled suites.

use std::fmt;
use std::path::Path;

use crate::context::Context;
use crate::error::Result;
use crate::ffmpeg_qsv::saturation;
use crate::gst_vaapi::avc;
use crate::parameters::gen_avc_cbr_parameters;
use crate::parameters::gen_avc_cqp_lp_parameters;
use crate::parameters::gen_avc_cqp_parameters;
use crate::parameters::gen_avc_vbr_parameters;
use crate::parameters::gen_vpp_saturation_parameters;
use crate::parameters::AvcCbrParams;
use crate::parameters::AvcCqpLpParams;
use crate::parameters::AvcCqpParams;
use crate::parameters::AvcVbrParams;
use crate::parameters::SaturationParams;
use crate::spec::load_test_spec;
use crate::spec::spec_path;
use crate::spec::TestSpec;

/// Specifications of all suites. A suite whose file is absent is disabled.
#[derive(Clone, Debug, Default)]
pub struct Specs {
    pub saturation: Option<TestSpec>,
    pub saturation_r2r: Option<TestSpec>,
    pub avc_encode: Option<TestSpec>,
}

fn load_optional(
    spec_dir: &Path,
    category: &str,
    name: &str,
    variant: Option<&str>,
) -> Result<Option<TestSpec>> {
    let path = spec_path(spec_dir, category, name, variant);
    if !path.exists() {
        log::warn!("No test spec at {:?}, suite disabled", path);
        return Ok(None);
    }
    load_test_spec(spec_dir, category, name, variant).map(Some)
}

impl Specs {
    pub fn load(spec_dir: &Path) -> Result<Self> {
        Ok(Self {
            saturation: load_optional(
                spec_dir,
                saturation::SPEC_CATEGORY,
                saturation::SPEC_NAME,
                None,
            )?,
            saturation_r2r: load_optional(
                spec_dir,
                saturation::SPEC_CATEGORY,
                saturation::SPEC_NAME,
                Some(saturation::SPEC_R2R_VARIANT),
            )?,
            avc_encode: load_optional(spec_dir, avc::SPEC_CATEGORY, avc::SPEC_NAME, None)?,
        })
    }
}

/// One parametrized test instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TestCase {
    SaturationDefault(SaturationParams),
    SaturationR2r(SaturationParams),
    AvcCqp(AvcCqpParams),
    AvcCqpLp(AvcCqpLpParams),
    AvcCbr(AvcCbrParams),
    AvcVbr(AvcVbrParams),
}

impl TestCase {
    /// Stable identifier, also the baseline key prefix.
    pub fn id(&self) -> String {
        let (suite, fields) = match self {
            TestCase::SaturationDefault(p) => ("ffmpeg-qsv/vpp/saturation/test_default", p.id_fields()),
            TestCase::SaturationR2r(p) => ("ffmpeg-qsv/vpp/saturation/test_r2r", p.id_fields()),
            TestCase::AvcCqp(p) => ("gst-vaapi/encode/avc/cqp", p.id_fields()),
            TestCase::AvcCqpLp(p) => ("gst-vaapi/encode/avc/cqp_lp", p.id_fields()),
            TestCase::AvcCbr(p) => ("gst-vaapi/encode/avc/cbr", p.id_fields()),
            TestCase::AvcVbr(p) => ("gst-vaapi/encode/avc/vbr", p.id_fields()),
        };
        format!("{}({})", suite, fields)
    }

    pub fn run(&self, ctx: &mut impl Context, specs: &Specs) -> Result<()> {
        // Instances are only enumerated from loaded specs.
        let empty = TestSpec::new();
        let saturation = specs.saturation.as_ref().unwrap_or(&empty);
        let saturation_r2r = specs.saturation_r2r.as_ref().unwrap_or(&empty);
        let avc_encode = specs.avc_encode.as_ref().unwrap_or(&empty);
        match self {
            TestCase::SaturationDefault(p) => saturation::test_default(ctx, saturation, p),
            TestCase::SaturationR2r(p) => saturation::test_r2r(ctx, saturation_r2r, p),
            TestCase::AvcCqp(p) => avc::cqp(ctx, avc_encode, p),
            TestCase::AvcCqpLp(p) => avc::cqp_lp(ctx, avc_encode, p),
            TestCase::AvcCbr(p) => avc::cbr(ctx, avc_encode, p),
            TestCase::AvcVbr(p) => avc::vbr(ctx, avc_encode, p),
        }
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.id())
    }
}

/// All instances of the loaded suites, in a stable order.
pub fn enumerate(specs: &Specs) -> Vec<TestCase> {
    let mut cases = Vec::new();
    if let Some(spec) = &specs.saturation {
        cases.extend(
            gen_vpp_saturation_parameters(spec)
                .into_iter()
                .map(TestCase::SaturationDefault),
        );
    }
    if let Some(spec) = &specs.saturation_r2r {
        cases.extend(
            gen_vpp_saturation_parameters(spec)
                .into_iter()
                .map(TestCase::SaturationR2r),
        );
    }
    if let Some(spec) = &specs.avc_encode {
        cases.extend(
            gen_avc_cqp_parameters(spec, avc::PROFILES)
                .into_iter()
                .map(TestCase::AvcCqp),
        );
        cases.extend(
            gen_avc_cqp_lp_parameters(spec, avc::LP_PROFILES)
                .into_iter()
                .map(TestCase::AvcCqpLp),
        );
        cases.extend(
            gen_avc_cbr_parameters(spec, avc::PROFILES)
                .into_iter()
                .map(TestCase::AvcCbr),
        );
        cases.extend(
            gen_avc_vbr_parameters(spec, avc::PROFILES)
                .into_iter()
                .map(TestCase::AvcVbr),
        );
    }
    cases
}

/// Keeps the instances whose ID contains any of `patterns`; no pattern keeps
/// everything.
pub fn filter(cases: Vec<TestCase>, patterns: &[String]) -> Vec<TestCase> {
    if patterns.is_empty() {
        return cases;
    }
    cases
        .into_iter()
        .filter(|case| {
            let id = case.id();
            patterns.iter().any(|pattern| id.contains(pattern.as_str()))
        })
        .collect()
}
