// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Fidelity and reproducibility metrics over raw output files.

use std::fs::File;
use std::io::BufReader;
use std::io::ErrorKind;
use std::io::Read;
use std::path::Path;

use openssl::hash::Hasher;
use openssl::hash::MessageDigest;
use serde_json::Value;

use crate::baseline::missing;
use crate::error::FitsError;
use crate::error::Result;
use crate::format::PixelFormat;

/// PSNR reported for identical planes, and the ceiling of every score.
pub const PERFECT_PSNR: f64 = 100.0;

pub const CHANNELS: [&str; 3] = ["Luma (Y)", "Cb (U)", "Cr (V)"];

/// Per-channel PSNR of a whole clip: the worst frame and the mean over all
/// frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Psnr {
    pub min: [f64; 3],
    pub avg: [f64; 3],
}

impl Psnr {
    pub fn y(&self) -> f64 {
        self.avg[0]
    }

    pub fn u(&self) -> f64 {
        self.avg[1]
    }

    pub fn v(&self) -> f64 {
        self.avg[2]
    }

    /// The baseline representation `[min Y, min U, min V, avg Y, avg U, avg V]`.
    pub fn to_value(&self) -> Value {
        Value::from(self.min.iter().chain(self.avg.iter()).copied().collect::<Vec<f64>>())
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        let values: Vec<f64> = value
            .as_array()?
            .iter()
            .map(Value::as_f64)
            .collect::<Option<_>>()?;
        if values.len() != 6 {
            return None;
        }
        Some(Psnr {
            min: [values[0], values[1], values[2]],
            avg: [values[3], values[4], values[5]],
        })
    }
}

/// Decodes the baseline reference handed to a comparison predicate.
pub fn reference_psnr(metric: &str, reference: Option<&Value>) -> Result<Psnr> {
    let reference = reference.ok_or_else(|| missing(metric))?;
    Psnr::from_value(reference).ok_or_else(|| FitsError::InvalidBaseline {
        metric: metric.to_string(),
        value: reference.to_string(),
    })
}

fn round4(value: f64) -> f64 {
    (value * 10000.0).round() / 10000.0
}

/// PSNR of one plane; `peak` is the largest sample value of the format.
pub fn plane_psnr(reference: &[u16], actual: &[u16], peak: f64) -> f64 {
    debug_assert_eq!(reference.len(), actual.len());
    if reference.is_empty() {
        return PERFECT_PSNR;
    }
    let sum: f64 = reference
        .iter()
        .zip(actual)
        .map(|(&r, &a)| {
            let diff = r as f64 - a as f64;
            diff * diff
        })
        .sum();
    let mse = sum / reference.len() as f64;
    if mse == 0.0 {
        return PERFECT_PSNR;
    }
    (10.0 * (peak * peak / mse).log10()).min(PERFECT_PSNR)
}

fn read_frame(reader: &mut impl Read, buf: &mut [u8], path: &Path, index: u32) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => FitsError::Parse {
            file: path.to_path_buf(),
            details: format!("file ends before frame {}", index),
        },
        _ => FitsError::Io(format!("Failed to read {:?}: {}", path, e)),
    })
}

fn open(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| FitsError::Io(format!("Failed to open {:?}: {}", path, e)))
}

/// Compares `frames` raw frames of `source` and `output`, both laid out as
/// `format`, and returns their per-channel PSNR.
pub fn calculate_psnr(
    source: &Path,
    output: &Path,
    width: u32,
    height: u32,
    frames: u32,
    format: PixelFormat,
) -> Result<Psnr> {
    let (width, height) = (width as usize, height as usize);
    let frame_size = format.frame_size(width, height);
    let peak = ((1u32 << format.bit_depth()) - 1) as f64;

    let mut source_reader = open(source)?;
    let mut output_reader = open(output)?;
    let mut source_frame = vec![0u8; frame_size];
    let mut output_frame = vec![0u8; frame_size];

    let mut min = [f64::MAX; 3];
    let mut sum = [0.0f64; 3];
    for index in 0..frames {
        read_frame(&mut source_reader, &mut source_frame, source, index)?;
        read_frame(&mut output_reader, &mut output_frame, output, index)?;

        let reference = format.split_frame(&source_frame, width, height);
        let actual = format.split_frame(&output_frame, width, height);
        let scores = [
            plane_psnr(&reference.y, &actual.y, peak),
            plane_psnr(&reference.u, &actual.u, peak),
            plane_psnr(&reference.v, &actual.v, peak),
        ];
        for c in 0..3 {
            min[c] = min[c].min(scores[c]);
            sum[c] += scores[c];
        }
    }

    let frames = frames.max(1) as f64;
    let psnr = Psnr {
        min: min.map(|v| round4(v.min(PERFECT_PSNR))),
        avg: sum.map(|v| round4(v / frames)),
    };
    log::debug!("PSNR of {:?} against {:?}: {:?}", output, source, psnr);
    Ok(psnr)
}

/// Lowercase hex MD5 digest of a file's contents.
pub fn md5(path: &Path) -> Result<String> {
    let mut reader = open(path)?;
    let mut hasher = Hasher::new(MessageDigest::md5())
        .map_err(|e| FitsError::Io(format!("Failed to create md5 hasher: {}", e)))?;
    let mut buf = vec![0u8; 1 << 16];
    loop {
        let n = reader
            .read(&mut buf)
            .map_err(|e| FitsError::Io(format!("Failed to read {:?}: {}", path, e)))?;
        if n == 0 {
            break;
        }
        hasher
            .update(&buf[..n])
            .map_err(|e| FitsError::Io(format!("Failed to hash {:?}: {}", path, e)))?;
    }
    let digest = hasher
        .finish()
        .map_err(|e| FitsError::Io(format!("Failed to hash {:?}: {}", path, e)))?;
    Ok(hex::encode(digest))
}

/// Average bitrate in kbps of an encoded stream of `frames` frames at `fps`.
pub fn bitrate_kbps(size_bytes: u64, fps: u32, frames: u32) -> f64 {
    size_bytes as f64 * 8.0 * fps as f64 / 1024.0 / frames.max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use tempfile::TempDir;

    #[test]
    fn identical_clips_are_perfect() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.yuv");
        let frame: Vec<u8> = (0..PixelFormat::I420.frame_size(4, 4) * 2)
            .map(|i| i as u8)
            .collect();
        fs::write(&a, &frame).unwrap();

        let psnr = calculate_psnr(&a, &a, 4, 4, 2, PixelFormat::I420).unwrap();
        assert_eq!(psnr.min, [PERFECT_PSNR; 3]);
        assert_eq!(psnr.avg, [PERFECT_PSNR; 3]);
    }

    #[test]
    fn chroma_change_leaves_luma_perfect() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.yuv");
        let b = dir.path().join("b.yuv");
        // 4x2 NV12: 8 luma bytes then 2 UV pairs.
        fs::write(&a, [16u8, 16, 16, 16, 16, 16, 16, 16, 128, 128, 128, 128]).unwrap();
        fs::write(&b, [16u8, 16, 16, 16, 16, 16, 16, 16, 138, 128, 128, 128]).unwrap();

        let psnr = calculate_psnr(&a, &b, 4, 2, 1, PixelFormat::NV12).unwrap();
        assert_eq!(psnr.y(), PERFECT_PSNR);
        assert_eq!(psnr.v(), PERFECT_PSNR);
        // MSE = 100 / 2 = 50.
        let expected = round4(10.0 * (255.0f64 * 255.0 / 50.0).log10());
        assert_eq!(psnr.u(), expected);
    }

    #[test]
    fn short_output_is_an_error() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.yuv");
        let b = dir.path().join("b.yuv");
        fs::write(&a, vec![0u8; 24]).unwrap();
        fs::write(&b, vec![0u8; 12]).unwrap();
        let err = calculate_psnr(&a, &b, 4, 2, 2, PixelFormat::I420).unwrap_err();
        assert!(matches!(err, FitsError::Parse { .. }), "{}", err);
    }

    #[test]
    fn md5_of_known_content() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a");
        fs::write(&a, b"abc").unwrap();
        assert_eq!(md5(&a).unwrap(), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn psnr_value_round_trip_shape() {
        let psnr = Psnr {
            min: [100.0, 40.0, 41.0],
            avg: [100.0, 42.5, 43.25],
        };
        let value = psnr.to_value();
        assert_eq!(value.as_array().unwrap().len(), 6);
        assert_eq!(Psnr::from_value(&value), Some(psnr));
        assert_eq!(Psnr::from_value(&Value::from(vec![1.0, 2.0])), None);
    }

    #[test]
    fn bitrate() {
        // 30 frames at 30 fps totalling 128 KiB is 1024 kbps.
        assert_eq!(bitrate_kbps(128 * 1024, 30, 30), 1024.0);
    }
}
