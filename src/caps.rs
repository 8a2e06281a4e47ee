// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Preconditions tests declare on the host: tools, plugins, driver and
//! platform. An unmet precondition skips the test.

use std::process::Output;

use lazy_static::lazy_static;
use regex::Regex;

use crate::command_runner::CommandRunner;
use crate::context::Context;
use crate::error::FitsError;
use crate::error::Result;

lazy_static! {
    // One acceleration method per line after the header of `ffmpeg -hwaccels`.
    static ref REGEX_HWACCEL: Regex = Regex::new(r"(?m)^\s*([a-z0-9_]+)\s*$").unwrap();
    // `ffmpeg -filters` rows look like " ... vpp_qsv   V->V   Quick Sync Video VPP."
    static ref REGEX_FILTER: Regex =
        Regex::new(r"(?m)^\s*[TSC.|]{2,3}\s+([A-Za-z0-9_]+)\s+\S+->\S+").unwrap();
    static ref REGEX_VA_DRIVER: Regex = Regex::new(r"(?m)Driver version:\s*(.+)$").unwrap();
}

/// VA-API driver the Quick Sync path needs.
pub const QSV_DRIVER: &str = "iHD";

pub const VPP_PLATFORMS: &[&str] = &[
    "BDW", "SKL", "APL", "KBL", "GLK", "CFL", "WHL", "ICL", "JSL", "EHL", "TGL",
];
pub const AVC_ENCODE_PLATFORMS: &[&str] = &[
    "BDW", "SKL", "APL", "KBL", "GLK", "CFL", "WHL", "ICL", "JSL", "EHL", "TGL",
];
pub const AVC_ENCODE_LP_PLATFORMS: &[&str] = &[
    "SKL", "APL", "KBL", "GLK", "CFL", "WHL", "ICL", "JSL", "EHL", "TGL",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requirement {
    Ffmpeg,
    FfmpegHwaccel(&'static str),
    FfmpegFilter(&'static str),
    Gst,
    GstElement(&'static str),
    /// The VA-API driver in use must be this one.
    Driver(&'static str),
    /// The configured platform, if any, must be listed.
    Platform(&'static [&'static str]),
}

fn query(ctx: &mut impl Context, program: &str, args: &[&str]) -> Option<Output> {
    let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
    match ctx.cmd_runner().run(program, &args) {
        Ok(output) if output.status.success() => Some(output),
        Ok(output) => {
            log::debug!("{} {:?} exited with {}", program, args, output.status);
            None
        }
        Err(err) => {
            log::debug!("{} {:?} could not run: {}", program, args, err);
            None
        }
    }
}

// Runs `check` once per run for `key` and remembers its answer.
fn cached<C: Context>(ctx: &mut C, key: &str, check: impl FnOnce(&mut C) -> bool) -> bool {
    if let Some(present) = ctx.media().capability(key) {
        return present;
    }
    let present = check(ctx);
    log::debug!("capability {}: {}", key, present);
    ctx.media().set_capability(key, present);
    present
}

fn combined_output(output: &Output) -> String {
    format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

pub fn have_ffmpeg(ctx: &mut impl Context) -> bool {
    let ffmpeg = ctx.media().config.tools.ffmpeg.clone();
    cached(ctx, "ffmpeg", |ctx| {
        query(ctx, &ffmpeg, &["-hide_banner", "-version"]).is_some()
    })
}

pub fn have_ffmpeg_hwaccel(ctx: &mut impl Context, accel: &str) -> bool {
    let ffmpeg = ctx.media().config.tools.ffmpeg.clone();
    cached(ctx, &format!("ffmpeg-hwaccel:{}", accel), |ctx| {
        query(ctx, &ffmpeg, &["-hide_banner", "-hwaccels"])
            .map(|output| {
                REGEX_HWACCEL
                    .captures_iter(&combined_output(&output))
                    .any(|c| &c[1] == accel)
            })
            .unwrap_or(false)
    })
}

pub fn have_ffmpeg_filter(ctx: &mut impl Context, filter: &str) -> bool {
    let ffmpeg = ctx.media().config.tools.ffmpeg.clone();
    cached(ctx, &format!("ffmpeg-filter:{}", filter), |ctx| {
        query(ctx, &ffmpeg, &["-hide_banner", "-filters"])
            .map(|output| {
                REGEX_FILTER
                    .captures_iter(&combined_output(&output))
                    .any(|c| &c[1] == filter)
            })
            .unwrap_or(false)
    })
}

pub fn have_gst(ctx: &mut impl Context) -> bool {
    let gst_launch = ctx.media().config.tools.gst_launch.clone();
    cached(ctx, "gst", |ctx| query(ctx, &gst_launch, &["--version"]).is_some())
}

pub fn have_gst_element(ctx: &mut impl Context, element: &str) -> bool {
    let gst_inspect = ctx.media().config.tools.gst_inspect.clone();
    cached(ctx, &format!("gst-element:{}", element), |ctx| {
        query(ctx, &gst_inspect, &[element]).is_some()
    })
}

/// Name of the VA-API driver reported by `vainfo`.
pub fn va_driver(ctx: &mut impl Context) -> Option<String> {
    let vainfo = ctx.media().config.tools.vainfo.clone();
    let output = query(ctx, &vainfo, &[])?;
    REGEX_VA_DRIVER
        .captures(&combined_output(&output))
        .map(|c| c[1].trim().to_string())
}

pub fn using_compatible_driver(ctx: &mut impl Context, driver: &str) -> bool {
    cached(ctx, &format!("driver:{}", driver), |ctx| {
        va_driver(ctx)
            .map(|version| version.contains(driver))
            .unwrap_or(false)
    })
}

/// Whether the configured platform is one of `platforms`. Without a
/// configured platform every test is eligible.
pub fn platform_supported(ctx: &mut impl Context, platforms: &[&str]) -> bool {
    match &ctx.media().config.platform {
        Some(platform) => platforms.iter().any(|p| p.eq_ignore_ascii_case(platform)),
        None => true,
    }
}

/// Checks `requirements` in order and skips on the first unmet one.
pub fn require(ctx: &mut impl Context, requirements: &[Requirement]) -> Result<()> {
    for requirement in requirements {
        let (met, what) = match *requirement {
            Requirement::Ffmpeg => (have_ffmpeg(ctx), "ffmpeg".to_string()),
            Requirement::FfmpegHwaccel(accel) => (
                have_ffmpeg_hwaccel(ctx, accel),
                format!("ffmpeg {} acceleration", accel),
            ),
            Requirement::FfmpegFilter(filter) => (
                have_ffmpeg_filter(ctx, filter),
                format!("ffmpeg filter {}", filter),
            ),
            Requirement::Gst => (have_gst(ctx), "gstreamer".to_string()),
            Requirement::GstElement(element) => (
                have_gst_element(ctx, element),
                format!("gstreamer element {}", element),
            ),
            Requirement::Driver(driver) => (
                using_compatible_driver(ctx, driver),
                format!("{} driver", driver),
            ),
            Requirement::Platform(platforms) => (
                platform_supported(ctx, platforms),
                "supported platform".to_string(),
            ),
        };
        if !met {
            return Err(FitsError::skip(format!("requires {}", what)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    use crate::command_runner::MockCommandInput;
    use crate::command_runner::MockCommandOutput;
    use crate::config::Config;
    use crate::context::mock::MockContext;

    const HWACCELS: &str = "Hardware acceleration methods:\nvdpau\nvaapi\nqsv\ndrm\n\n";
    const FILTERS: &str = "Filters:\n  T.. = Timeline support\n  ---\n \
        ... vpp_qsv           V->V       Quick Sync Video VPP.\n \
        TSC scale_vaapi       V->V       Scale to/from VAAPI surfaces.\n";

    #[test]
    fn parses_hwaccels_once() {
        let dir = TempDir::new().unwrap();
        let mut ctx = MockContext::new(dir.path());
        ctx.cmd_runner().add_expectation(
            MockCommandInput::new("ffmpeg", vec!["-hide_banner", "-hwaccels"]),
            MockCommandOutput::new(0, HWACCELS, ""),
        );
        assert!(have_ffmpeg_hwaccel(&mut ctx, "qsv"));
        // Cached: no second process.
        assert!(have_ffmpeg_hwaccel(&mut ctx, "qsv"));
    }

    #[test]
    fn parses_filters() {
        let dir = TempDir::new().unwrap();
        let mut ctx = MockContext::new(dir.path());
        ctx.cmd_runner()
            .expect_program("ffmpeg", MockCommandOutput::new(0, FILTERS, ""));
        ctx.cmd_runner()
            .expect_program("ffmpeg", MockCommandOutput::new(0, FILTERS, ""));
        assert!(have_ffmpeg_filter(&mut ctx, "vpp_qsv"));
        assert!(!have_ffmpeg_filter(&mut ctx, "procamp_vaapi"));
    }

    #[test]
    fn missing_gst_element_skips() {
        let dir = TempDir::new().unwrap();
        let mut ctx = MockContext::new(dir.path());
        ctx.cmd_runner().add_expectation(
            MockCommandInput::new("gst-launch-1.0", vec!["--version"]),
            MockCommandOutput::success(),
        );
        ctx.cmd_runner().add_expectation(
            MockCommandInput::new("gst-inspect-1.0", vec!["vaapih264enc"]),
            MockCommandOutput::new(1, "", "No such element or plugin"),
        );
        let err = require(
            &mut ctx,
            &[Requirement::Gst, Requirement::GstElement("vaapih264enc")],
        )
        .unwrap_err();
        assert!(err.is_skip());
        assert!(err.to_string().contains("vaapih264enc"), "{}", err);
    }

    #[test]
    fn driver_from_vainfo() {
        let dir = TempDir::new().unwrap();
        let mut ctx = MockContext::new(dir.path());
        ctx.cmd_runner().expect_program(
            "vainfo",
            MockCommandOutput::new(
                0,
                "vainfo: VA-API version: 1.4 (libva 2.4.0)\n\
                 vainfo: Driver version: Intel iHD driver - 1.0.0\n",
                "",
            ),
        );
        assert!(using_compatible_driver(&mut ctx, QSV_DRIVER));
    }

    #[test]
    fn platform_tags() {
        let dir = TempDir::new().unwrap();
        let mut ctx = MockContext::with_config(Config {
            artifact_dir: dir.path().to_path_buf(),
            command_logs: false,
            platform: Some("bdw".to_string()),
            ..Default::default()
        });
        assert!(platform_supported(&mut ctx, AVC_ENCODE_PLATFORMS));
        assert!(require(&mut ctx, &[Requirement::Platform(AVC_ENCODE_LP_PLATFORMS)])
            .unwrap_err()
            .is_skip());
    }
}
