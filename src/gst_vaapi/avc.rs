// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! H.264 encoding through `vaapih264enc`.

use std::path::PathBuf;

use crate::caps::require;
use crate::caps::AVC_ENCODE_LP_PLATFORMS;
use crate::caps::AVC_ENCODE_PLATFORMS;
use crate::context::Context;
use crate::error::FitsError;
use crate::error::Result;
use crate::gst_vaapi::encoder::CodecDef;
use crate::gst_vaapi::encoder::EncoderTest;
use crate::gst_vaapi::encoder::RateControl;
use crate::parameters::AvcCbrParams;
use crate::parameters::AvcCqpLpParams;
use crate::parameters::AvcCqpParams;
use crate::parameters::AvcVbrParams;
use crate::spec::CaseSpec;
use crate::spec::TestSpec;

pub const SPEC_CATEGORY: &str = "avc";
pub const SPEC_NAME: &str = "encode";

pub static AVC: CodecDef = CodecDef {
    codec: "avc",
    gstencoder: "vaapih264enc",
    gstdecoder: "h264parse ! vaapih264dec",
    gstdecoder_element: "vaapih264dec",
    gstmediatype: "video/x-h264",
    gstparser: "h264parse",
    file_ext: "h264",
    profiles: &[
        ("baseline", "baseline"),
        ("constrained-baseline", "constrained-baseline"),
        ("main", "main"),
        ("high", "high"),
    ],
};

/// Profiles requested for the non low-power modes.
pub const PROFILES: &[&str] = &["main", "high"];
pub const LP_PROFILES: &[&str] = &["high", "main"];

/// Share of the ceiling gst-vaapi targets in VBR mode.
const VBR_TARGET_PERCENTAGE: f64 = 0.70;

fn lookup<'a>(spec: &'a TestSpec, case: &str) -> Result<&'a CaseSpec> {
    spec.get(case).ok_or_else(|| FitsError::InvalidSpec {
        file: PathBuf::from(SPEC_NAME),
        details: format!("unknown case {}", case),
    })
}

pub fn cqp(ctx: &mut impl Context, spec: &TestSpec, p: &AvcCqpParams) -> Result<()> {
    require(ctx, &AVC.requirements(AVC_ENCODE_PLATFORMS))?;
    let mut test = EncoderTest::new(
        &AVC,
        &p.case,
        lookup(spec, &p.case)?,
        RateControl::Cqp,
        &p.profile,
    );
    test.gop = Some(p.gop);
    test.slices = Some(p.slices);
    test.bframes = Some(p.bframes);
    test.qp = Some(p.qp);
    test.quality = Some(p.quality);
    test.encode(ctx)
}

pub fn cqp_lp(ctx: &mut impl Context, spec: &TestSpec, p: &AvcCqpLpParams) -> Result<()> {
    require(ctx, &AVC.requirements(AVC_ENCODE_LP_PLATFORMS))?;
    let mut test = EncoderTest::new(
        &AVC,
        &p.case,
        lookup(spec, &p.case)?,
        RateControl::Cqp,
        &p.profile,
    );
    test.gop = Some(p.gop);
    test.slices = Some(p.slices);
    test.qp = Some(p.qp);
    test.quality = Some(p.quality);
    test.lowpower = true;
    test.encode(ctx)
}

pub fn cbr(ctx: &mut impl Context, spec: &TestSpec, p: &AvcCbrParams) -> Result<()> {
    require(ctx, &AVC.requirements(AVC_ENCODE_PLATFORMS))?;
    let mut test = EncoderTest::new(
        &AVC,
        &p.case,
        lookup(spec, &p.case)?,
        RateControl::Cbr,
        &p.profile,
    );
    test.gop = Some(p.gop);
    test.slices = Some(p.slices);
    test.bframes = Some(p.bframes);
    test.bitrate = Some(p.bitrate);
    test.minrate = Some(p.bitrate);
    test.maxrate = Some(p.bitrate);
    test.fps = Some(p.fps);
    test.encode(ctx)
}

pub fn vbr(ctx: &mut impl Context, spec: &TestSpec, p: &AvcVbrParams) -> Result<()> {
    require(ctx, &AVC.requirements(AVC_ENCODE_PLATFORMS))?;
    let mut test = EncoderTest::new(
        &AVC,
        &p.case,
        lookup(spec, &p.case)?,
        RateControl::Vbr,
        &p.profile,
    );
    test.gop = Some(p.gop);
    test.slices = Some(p.slices);
    test.bframes = Some(p.bframes);
    test.bitrate = Some(p.bitrate);
    test.minrate = Some(p.bitrate);
    // gst-vaapi sets min-bitrate = bitrate * 0.70, so asking for
    // bitrate / 0.70 keeps the floor at the requested bitrate.
    test.maxrate = Some((p.bitrate as f64 / VBR_TARGET_PERCENTAGE) as u32);
    test.fps = Some(p.fps);
    test.quality = Some(p.quality);
    test.refs = Some(p.refs);
    test.encode(ctx)
}
