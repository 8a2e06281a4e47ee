// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Tests driving ffmpeg through its Intel Quick Sync Video path.

pub mod saturation;

use crate::caps::Requirement;
use crate::caps::QSV_DRIVER;
use crate::error::FitsError;
use crate::error::Result;
use crate::format::PixelFormat;

/// Preconditions shared by every ffmpeg-qsv VPP test.
pub const VPP_REQUIREMENTS: &[Requirement] = &[
    Requirement::Ffmpeg,
    Requirement::FfmpegHwaccel("qsv"),
    Requirement::FfmpegFilter("vpp_qsv"),
    Requirement::Driver(QSV_DRIVER),
];

/// Arguments selecting the QSV device for decoding and filtering.
pub fn hw_device_args() -> [&'static str; 6] {
    [
        "-init_hw_device",
        "qsv=qsv:hw",
        "-hwaccel",
        "qsv",
        "-filter_hw_device",
        "qsv",
    ]
}

/// Maps a spec format name to its layout and ffmpeg `-pix_fmt` token, or
/// skips the test when ffmpeg has none.
pub fn mapformat(format: &str) -> Result<(PixelFormat, &'static str)> {
    PixelFormat::from_name(format)
        .and_then(|f| f.ffmpeg_pix_fmt().map(|token| (f, token)))
        .ok_or_else(|| FitsError::skip(format!("{} format not supported", format)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_formats_skip() {
        assert_eq!(
            mapformat("NV12").unwrap(),
            (PixelFormat::NV12, "nv12")
        );
        assert!(mapformat("YV12").unwrap_err().is_skip());
        assert!(mapformat("BGRA").unwrap_err().is_skip());
    }
}
