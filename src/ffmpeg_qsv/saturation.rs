// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Saturation adjustment through the `vpp_qsv` procamp filter.
//!
//! `test_default` checks fidelity: saturation must never touch luma, and
//! chroma must either be untouched (at the no-op level) or match the baseline.
//! `test_r2r` checks that repeated identical runs give bit-identical output.

use std::path::PathBuf;

use crate::baseline::Metrics;
use crate::caps::require;
use crate::caps::Requirement;
use crate::caps::VPP_PLATFORMS;
use crate::command::format_fraction;
use crate::command::map_range;
use crate::command::Invocation;
use crate::context::Context;
use crate::error::FitsError;
use crate::error::Result;
use crate::exec::call;
use crate::ffmpeg_qsv::hw_device_args;
use crate::ffmpeg_qsv::mapformat;
use crate::ffmpeg_qsv::VPP_REQUIREMENTS;
use crate::format::PixelFormat;
use crate::metrics::calculate_psnr;
use crate::metrics::md5;
use crate::metrics::reference_psnr;
use crate::metrics::CHANNELS;
use crate::metrics::PERFECT_PSNR;
use crate::parameters::SaturationParams;
use crate::spec::CaseSpec;
use crate::spec::TestSpec;

pub const SPEC_CATEGORY: &str = "vpp";
pub const SPEC_NAME: &str = "saturation";
pub const SPEC_R2R_VARIANT: &str = "r2r";

/// Level 10 maps to a saturation factor of 1.0 in ffmpeg, i.e. unchanged.
pub const NOOP_LEVEL: u32 = 10;

/// Fully resolved parameters of one saturation test instance.
#[derive(Clone, Debug)]
pub struct SaturationTest {
    pub case: String,
    pub spec: CaseSpec,
    pub level: u32,
    /// `level` mapped onto ffmpeg's 0.0-10.0 saturation range.
    pub mlevel: String,
    pub format: PixelFormat,
    pub mformat: &'static str,
    pub ofile: PathBuf,
}

pub fn init(spec: &TestSpec, case: &str, level: u32) -> Result<SaturationTest> {
    let params = spec.get(case).ok_or_else(|| FitsError::InvalidSpec {
        file: PathBuf::from(SPEC_NAME),
        details: format!("unknown case {}", case),
    })?;
    let (format, mformat) = mapformat(&params.format)?;
    Ok(SaturationTest {
        case: case.to_string(),
        spec: params.clone(),
        level,
        mlevel: format_fraction(map_range(level as f64, (0.0, 100.0), (0.0, 10.0))),
        format,
        mformat,
        ofile: PathBuf::new(),
    })
}

pub fn requirements() -> Vec<Requirement> {
    let mut requirements = VPP_REQUIREMENTS.to_vec();
    requirements.push(Requirement::Platform(VPP_PLATFORMS));
    requirements
}

impl SaturationTest {
    fn base_name(&self) -> String {
        format!(
            "{}_saturation_{}_{}_{}x{}",
            self.case, self.level, self.spec.format, self.spec.width, self.spec.height
        )
    }

    /// Output name of the first (or only) run.
    pub fn output_name(&self, r2r: bool) -> String {
        if r2r {
            format!("{}_r2r.yuv", self.base_name())
        } else {
            format!("{}.yuv", self.base_name())
        }
    }

    /// Output name of the `run`-th repeat of a run-to-run test.
    pub fn repeat_name(&self, run: u32) -> String {
        format!("{}_{}.yuv", self.base_name(), run)
    }

    pub fn command(&self, ffmpeg: &str) -> Invocation {
        let size = format!("{}x{}", self.spec.width, self.spec.height);
        let filter = format!(
            "format=nv12,hwupload=extra_hw_frames=16,\
             vpp_qsv=procamp=1:saturation={},hwdownload,format=nv12",
            self.mlevel
        );
        Invocation::new(ffmpeg)
            .args(hw_device_args())
            .args(["-v", "debug", "-f", "rawvideo", "-pix_fmt", self.mformat])
            .args(["-s:v", size.as_str()])
            .arg("-i")
            .arg(self.spec.source.display().to_string())
            .args(["-vf", filter.as_str()])
            .args(["-pix_fmt", self.mformat, "-an", "-vframes"])
            .arg(self.spec.frames.to_string())
            .arg("-y")
            .arg(self.ofile.display().to_string())
    }

    /// Runs the filter into the artifact `name`.
    fn gen_output(&mut self, ctx: &mut impl Context, name: &str) -> Result<()> {
        self.ofile = ctx.media().test_artifact(name)?;
        let ffmpeg = ctx.media().config.tools.ffmpeg.clone();
        call(ctx, &self.command(&ffmpeg))?;
        Ok(())
    }
}

fn expect_perfect(channel: usize, actual: f64, reason: &'static str) -> Result<()> {
    if actual == PERFECT_PSNR {
        Ok(())
    } else {
        Err(FitsError::NotPerfect {
            channel: CHANNELS[channel],
            expected: PERFECT_PSNR,
            actual,
            reason,
        })
    }
}

pub fn test_default(ctx: &mut impl Context, spec: &TestSpec, params: &SaturationParams) -> Result<()> {
    require(ctx, &requirements())?;
    let mut test = init(spec, &params.case, params.level)?;
    let name = test.output_name(false);
    test.gen_output(ctx, &name)?;

    let psnr = calculate_psnr(
        &test.spec.source,
        &test.ofile,
        test.spec.width,
        test.spec.height,
        test.spec.frames,
        test.format,
    )?;
    ctx.media().set_test_detail("psnr", psnr.to_value());

    expect_perfect(0, psnr.y(), "should not be affected by SATURATION filter")?;

    if test.level == NOOP_LEVEL {
        ctx.media().set_test_detail("ref_psnr", "noop");
        expect_perfect(1, psnr.u(), "should not be affected at NOOP level")?;
        expect_perfect(2, psnr.v(), "should not be affected at NOOP level")?;
        return Ok(());
    }

    let tolerance = ctx.media().config.psnr_tolerance;
    let mut metrics = Metrics::new();
    metrics.insert("psnr".to_string(), psnr.to_value());
    ctx.media()
        .check_result(&test.spec.refctx, metrics, |name, reference, actual| {
            let reference = reference_psnr(name, reference)?;
            let actual = reference_psnr(name, Some(actual))?;
            for channel in [1, 2] {
                let (r, a) = (reference.avg[channel], actual.avg[channel]);
                if (r - a).abs() >= tolerance {
                    return Err(FitsError::OutOfTolerance {
                        channel: CHANNELS[channel],
                        reference: r,
                        actual: a,
                        tolerance,
                    });
                }
            }
            Ok(())
        })
}

pub fn test_r2r(ctx: &mut impl Context, spec: &TestSpec, params: &SaturationParams) -> Result<()> {
    require(ctx, &requirements())?;
    let mut test = init(spec, &params.case, params.level)?;
    let runs = test.spec.r2r.unwrap_or(ctx.media().config.r2r_runs);
    if runs < 2 {
        return Err(FitsError::InvalidSpec {
            file: PathBuf::from(SPEC_NAME),
            details: format!("invalid r2r value {}", runs),
        });
    }

    let name = test.output_name(true);
    test.gen_output(ctx, &name)?;
    let md5_ref = md5(&test.ofile)?;
    ctx.media().set_test_detail("md5_ref", md5_ref.as_str());
    ctx.media().purge_test_artifact(&test.ofile)?;

    for run in 1..runs {
        let name = test.repeat_name(run);
        test.gen_output(ctx, &name)?;
        let result = md5(&test.ofile)?;
        ctx.media()
            .set_test_detail(&format!("md5_{:03}", run), result.as_str());
        ctx.media().purge_test_artifact(&test.ofile)?;
        if result != md5_ref {
            return Err(FitsError::DigestMismatch {
                run,
                reference: md5_ref,
                actual: result,
            });
        }
    }
    Ok(())
}
