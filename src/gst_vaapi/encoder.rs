// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Encode/decode round trip shared by every gst-vaapi encoder test.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::baseline::Metrics;
use crate::caps::Requirement;
use crate::command::Invocation;
use crate::command::Pipeline;
use crate::context::Context;
use crate::error::FitsError;
use crate::error::Result;
use crate::exec::call;
use crate::format::PixelFormat;
use crate::metrics::bitrate_kbps;
use crate::metrics::calculate_psnr;
use crate::metrics::reference_psnr;
use crate::metrics::CHANNELS;
use crate::spec::CaseSpec;

/// GStreamer elements and conventions of one codec.
#[derive(Debug)]
pub struct CodecDef {
    pub codec: &'static str,
    pub gstencoder: &'static str,
    /// Decode chain in gst-launch syntax.
    pub gstdecoder: &'static str,
    pub gstdecoder_element: &'static str,
    pub gstmediatype: &'static str,
    pub gstparser: &'static str,
    pub file_ext: &'static str,
    /// Spec profile name to caps profile name.
    pub profiles: &'static [(&'static str, &'static str)],
}

impl CodecDef {
    pub fn mapprofile(&self, profile: &str) -> Option<&'static str> {
        self.profiles
            .iter()
            .find(|(name, _)| *name == profile)
            .map(|(_, caps)| *caps)
    }

    pub fn requirements(&self, platforms: &'static [&'static str]) -> Vec<Requirement> {
        vec![
            Requirement::Gst,
            Requirement::GstElement(self.gstencoder),
            Requirement::GstElement(self.gstdecoder_element),
            Requirement::GstElement("matroskamux"),
            Requirement::Platform(platforms),
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateControl {
    Cqp,
    Cbr,
    Vbr,
}

impl fmt::Display for RateControl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            RateControl::Cqp => "cqp",
            RateControl::Cbr => "cbr",
            RateControl::Vbr => "vbr",
        })
    }
}

/// One encoder test instance. Unset options are left to the encoder's
/// defaults.
#[derive(Clone, Debug)]
pub struct EncoderTest {
    pub codec: &'static CodecDef,
    pub case: String,
    pub spec: CaseSpec,
    pub rcmode: RateControl,
    pub profile: String,
    pub gop: Option<u32>,
    pub slices: Option<u32>,
    pub bframes: Option<u32>,
    pub qp: Option<u32>,
    pub quality: Option<u32>,
    /// Target bitrate in kbps.
    pub bitrate: Option<u32>,
    pub minrate: Option<u32>,
    pub maxrate: Option<u32>,
    pub fps: Option<u32>,
    pub refs: Option<u32>,
    pub lowpower: bool,
}

impl EncoderTest {
    pub fn new(
        codec: &'static CodecDef,
        case: &str,
        spec: &CaseSpec,
        rcmode: RateControl,
        profile: &str,
    ) -> Self {
        Self {
            codec,
            case: case.to_string(),
            spec: spec.clone(),
            rcmode,
            profile: profile.to_string(),
            gop: None,
            slices: None,
            bframes: None,
            qp: None,
            quality: None,
            bitrate: None,
            minrate: None,
            maxrate: None,
            fps: spec.fps,
            refs: None,
            lowpower: false,
        }
    }

    /// Artifact base name; distinct for every parameter combination of a
    /// rate-control mode.
    pub fn gen_name(&self) -> String {
        let mut name = format!("{}-{}-{}", self.case, self.rcmode, self.profile);
        let fields = [
            ("g", self.gop),
            ("s", self.slices),
            ("b", self.bframes),
            ("qp", self.qp),
            ("q", self.quality),
            ("min", self.minrate),
            ("max", self.maxrate),
            ("fps", self.fps),
            ("r", self.refs),
        ];
        for (prefix, value) in fields {
            if let Some(value) = value {
                name.push_str(&format!("-{}{}", prefix, value));
            }
        }
        if self.lowpower {
            name.push_str("-lp");
        }
        name
    }

    fn encoder_props(&self) -> Vec<String> {
        let mut props = vec![format!("rate-control={}", self.rcmode)];
        let mut push = |prop: &str, value: Option<u32>| {
            if let Some(value) = value {
                props.push(format!("{}={}", prop, value));
            }
        };
        push("keyframe-period", self.gop);
        push("num-slices", self.slices);
        push("max-bframes", self.bframes);
        push("init-qp", self.qp);
        push("quality-level", self.quality);
        // gst-vaapi derives the lower bound itself, so only the ceiling is set.
        push("bitrate", self.maxrate);
        push("refs", self.refs);
        if self.lowpower {
            props.push("tune=low-power".to_string());
        }
        props
    }

    pub fn encode_command(
        &self,
        gst_launch: &str,
        format: PixelFormat,
        mformat: &str,
        mprofile: &str,
        encoded: &Path,
    ) -> Invocation {
        let (width, height) = (self.spec.width, self.spec.height);
        let frame_size = format.frame_size(width as usize, height as usize);
        let mut parse_props = vec![
            format!("format={}", mformat),
            format!("width={}", width),
            format!("height={}", height),
        ];
        if let Some(fps) = self.fps {
            parse_props.push(format!("framerate={}/1", fps));
        }

        let pipeline = Pipeline::new()
            .element(
                "filesrc",
                [
                    format!("location={}", self.spec.source.display()),
                    format!("num-buffers={}", self.spec.frames),
                    format!("blocksize={}", frame_size),
                ],
            )
            .element("rawvideoparse", parse_props)
            .element("videoconvert", Vec::<String>::new())
            .element("video/x-raw,format=NV12", Vec::<String>::new())
            .element(self.codec.gstencoder, self.encoder_props())
            .element(
                &format!("{},profile={}", self.codec.gstmediatype, mprofile),
                Vec::<String>::new(),
            )
            .element(self.codec.gstparser, Vec::<String>::new())
            .element("filesink", [format!("location={}", encoded.display())]);
        Invocation::new(gst_launch).arg("-vf").args(pipeline.into_args())
    }

    pub fn decode_command(&self, gst_launch: &str, mformat: &str, encoded: &Path, decoded: &Path) -> Invocation {
        let pipeline = Pipeline::new()
            .element("filesrc", [format!("location={}", encoded.display())])
            .chain(self.codec.gstdecoder)
            .element("videoconvert", Vec::<String>::new())
            .element(&format!("video/x-raw,format={}", mformat), Vec::<String>::new())
            .element("filesink", [format!("location={}", decoded.display())]);
        Invocation::new(gst_launch).arg("-vf").args(pipeline.into_args())
    }

    pub fn remux_command(&self, gst_launch: &str, encoded: &Path, remuxed: &Path) -> Invocation {
        let pipeline = Pipeline::new()
            .element("filesrc", [format!("location={}", encoded.display())])
            .element(self.codec.gstparser, Vec::<String>::new())
            .element("matroskamux", Vec::<String>::new())
            .element("filesink", [format!("location={}", remuxed.display())]);
        Invocation::new(gst_launch).arg("-vf").args(pipeline.into_args())
    }

    /// Encodes the source, then decodes and remuxes the result and checks
    /// bitrate and fidelity.
    pub fn encode(&self, ctx: &mut impl Context) -> Result<()> {
        let format = PixelFormat::from_name(&self.spec.format);
        let mformat = format.and_then(PixelFormat::gst_format);
        let (format, mformat) = match (format, mformat) {
            (Some(format), Some(mformat)) => (format, mformat),
            _ => {
                return Err(FitsError::skip(format!(
                    "{} format not supported",
                    self.spec.format
                )))
            }
        };
        let mprofile = self.codec.mapprofile(&self.profile).ok_or_else(|| {
            FitsError::skip(format!("{} profile is not supported", self.profile))
        })?;

        let name = self.gen_name();
        log::info!("Encoding {} as {}", name, self.codec.codec);
        ctx.media().set_test_detail("codec", self.codec.codec);
        let gst_launch = ctx.media().config.tools.gst_launch.clone();
        let encoded = ctx
            .media()
            .test_artifact(&format!("{}.{}", name, self.codec.file_ext))?;
        let decoded = ctx.media().test_artifact(&format!("{}.yuv", name))?;
        let remuxed = ctx.media().test_artifact(&format!("{}.mkv", name))?;

        call(ctx, &self.encode_command(&gst_launch, format, mformat, mprofile, &encoded))?;
        call(ctx, &self.decode_command(&gst_launch, mformat, &encoded, &decoded))?;
        call(ctx, &self.remux_command(&gst_launch, &encoded, &remuxed))?;

        self.check_bitrate(ctx, &encoded)?;
        self.check_metrics(ctx, format, &decoded)
    }

    fn check_bitrate(&self, ctx: &mut impl Context, encoded: &Path) -> Result<()> {
        let size = fs::metadata(encoded)
            .map_err(|e| FitsError::Io(format!("Failed to stat {:?}: {}", encoded, e)))?
            .len();
        ctx.media().set_test_detail("size_encoded", size);

        let Some(fps) = self.fps else {
            return Ok(());
        };
        let actual = bitrate_kbps(size, fps, self.spec.frames);
        ctx.media()
            .set_test_detail("bitrate_actual", format!("{:.2}", actual));

        let (min, max) = match (self.rcmode, self.bitrate, self.minrate, self.maxrate) {
            (RateControl::Cbr, Some(bitrate), _, _) => {
                let gap = (actual - bitrate as f64).abs() / bitrate as f64;
                ctx.media()
                    .set_test_detail("bitrate_gap", format!("{:.2}%", gap * 100.0));
                (bitrate as f64 * 0.90, bitrate as f64 * 1.10)
            }
            // Accept 25% under the floor and 10% over the ceiling.
            (RateControl::Vbr, _, Some(minrate), Some(maxrate)) => {
                (minrate as f64 * 0.75, maxrate as f64 * 1.10)
            }
            _ => return Ok(()),
        };
        if actual < min || actual > max {
            return Err(FitsError::BitrateOutOfRange { actual, min, max });
        }
        Ok(())
    }

    fn check_metrics(&self, ctx: &mut impl Context, format: PixelFormat, decoded: &Path) -> Result<()> {
        let psnr = calculate_psnr(
            &self.spec.source,
            decoded,
            self.spec.width,
            self.spec.height,
            self.spec.frames,
            format,
        )?;
        ctx.media().set_test_detail("psnr", psnr.to_value());

        let tolerance = ctx.media().config.psnr_tolerance;
        let mut metrics = Metrics::new();
        metrics.insert("psnr".to_string(), psnr.to_value());
        ctx.media()
            .check_result(&self.spec.refctx, metrics, |name, reference, actual| {
                let reference = reference_psnr(name, reference)?;
                let actual = reference_psnr(name, Some(actual))?;
                // Only a drop in quality is a regression.
                for channel in 0..3 {
                    let (r, a) = (reference.avg[channel], actual.avg[channel]);
                    if a <= r - tolerance {
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
}
