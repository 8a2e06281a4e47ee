// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Raw pixel formats used by the test media and their names in the external
//! frameworks.

use std::fmt;

/// Abstract pixel format of a raw test stream, as named in test specs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    I420,
    YV12,
    NV12,
    P010,
    YUY2,
    /// Planar 4:2:2.
    Yuv422H,
    /// Planar 4:4:4.
    Yuv444P,
}

/// One frame split into its Y, U and V samples.
#[derive(Debug, Default, PartialEq)]
pub struct Planes {
    pub y: Vec<u16>,
    pub u: Vec<u16>,
    pub v: Vec<u16>,
}

impl PixelFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "I420" => Some(PixelFormat::I420),
            "YV12" => Some(PixelFormat::YV12),
            "NV12" => Some(PixelFormat::NV12),
            "P010" => Some(PixelFormat::P010),
            "YUY2" => Some(PixelFormat::YUY2),
            "422H" => Some(PixelFormat::Yuv422H),
            "444P" => Some(PixelFormat::Yuv444P),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PixelFormat::I420 => "I420",
            PixelFormat::YV12 => "YV12",
            PixelFormat::NV12 => "NV12",
            PixelFormat::P010 => "P010",
            PixelFormat::YUY2 => "YUY2",
            PixelFormat::Yuv422H => "422H",
            PixelFormat::Yuv444P => "444P",
        }
    }

    /// The `-pix_fmt` token understood by ffmpeg. YV12 has no ffmpeg
    /// equivalent with the same plane order.
    pub fn ffmpeg_pix_fmt(self) -> Option<&'static str> {
        match self {
            PixelFormat::I420 => Some("yuv420p"),
            PixelFormat::NV12 => Some("nv12"),
            PixelFormat::P010 => Some("p010le"),
            PixelFormat::YUY2 => Some("yuyv422"),
            PixelFormat::Yuv422H => Some("yuv422p"),
            PixelFormat::Yuv444P => Some("yuv444p"),
            PixelFormat::YV12 => None,
        }
    }

    /// The `video/x-raw` format token understood by GStreamer.
    pub fn gst_format(self) -> Option<&'static str> {
        match self {
            PixelFormat::I420 => Some("I420"),
            PixelFormat::YV12 => Some("YV12"),
            PixelFormat::NV12 => Some("NV12"),
            PixelFormat::P010 => Some("P010_10LE"),
            PixelFormat::YUY2 => Some("YUY2"),
            PixelFormat::Yuv422H => Some("Y42B"),
            PixelFormat::Yuv444P => Some("Y444"),
        }
    }

    pub fn bit_depth(self) -> u32 {
        match self {
            PixelFormat::P010 => 10,
            _ => 8,
        }
    }

    fn bytes_per_sample(self) -> usize {
        match self {
            PixelFormat::P010 => 2,
            _ => 1,
        }
    }

    /// Width and height of each chroma plane.
    pub fn chroma_size(self, width: usize, height: usize) -> (usize, usize) {
        let half_w = (width + 1) / 2;
        let half_h = (height + 1) / 2;
        match self {
            PixelFormat::I420 | PixelFormat::YV12 | PixelFormat::NV12 | PixelFormat::P010 => {
                (half_w, half_h)
            }
            PixelFormat::YUY2 | PixelFormat::Yuv422H => (half_w, height),
            PixelFormat::Yuv444P => (width, height),
        }
    }

    /// Size in bytes of one raw frame.
    pub fn frame_size(self, width: usize, height: usize) -> usize {
        let (cw, ch) = self.chroma_size(width, height);
        match self {
            // Each macropixel carries two luma and one pair of chroma samples.
            PixelFormat::YUY2 => cw * 4 * height,
            _ => (width * height + 2 * cw * ch) * self.bytes_per_sample(),
        }
    }

    /// Splits one raw frame into planes. `frame` must be exactly
    /// `frame_size(width, height)` bytes long.
    pub fn split_frame(self, frame: &[u8], width: usize, height: usize) -> Planes {
        debug_assert_eq!(frame.len(), self.frame_size(width, height));
        let (cw, ch) = self.chroma_size(width, height);
        let luma = width * height;
        let chroma = cw * ch;

        match self {
            PixelFormat::I420 | PixelFormat::Yuv422H | PixelFormat::Yuv444P => Planes {
                y: widen(&frame[..luma]),
                u: widen(&frame[luma..luma + chroma]),
                v: widen(&frame[luma + chroma..luma + 2 * chroma]),
            },
            PixelFormat::YV12 => Planes {
                y: widen(&frame[..luma]),
                v: widen(&frame[luma..luma + chroma]),
                u: widen(&frame[luma + chroma..luma + 2 * chroma]),
            },
            PixelFormat::NV12 => {
                let (u, v) = deinterleave(&widen(&frame[luma..luma + 2 * chroma]));
                Planes {
                    y: widen(&frame[..luma]),
                    u,
                    v,
                }
            }
            PixelFormat::P010 => {
                let (u, v) = deinterleave(&widen_p010(&frame[luma * 2..(luma + 2 * chroma) * 2]));
                Planes {
                    y: widen_p010(&frame[..luma * 2]),
                    u,
                    v,
                }
            }
            PixelFormat::YUY2 => {
                let mut planes = Planes {
                    y: Vec::with_capacity(luma),
                    u: Vec::with_capacity(chroma),
                    v: Vec::with_capacity(chroma),
                };
                for row in frame.chunks_exact(cw * 4) {
                    for (x, macropixel) in row.chunks_exact(4).enumerate() {
                        planes.y.push(macropixel[0] as u16);
                        if 2 * x + 1 < width {
                            planes.y.push(macropixel[2] as u16);
                        }
                        planes.u.push(macropixel[1] as u16);
                        planes.v.push(macropixel[3] as u16);
                    }
                }
                planes
            }
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn widen(bytes: &[u8]) -> Vec<u16> {
    bytes.iter().map(|&b| b as u16).collect()
}

// P010 keeps its 10 significant bits in the high end of each LE 16-bit word.
fn widen_p010(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|w| u16::from_le_bytes([w[0], w[1]]) >> 6)
        .collect()
}

fn deinterleave(samples: &[u16]) -> (Vec<u16>, Vec<u16>) {
    samples.chunks_exact(2).map(|pair| (pair[0], pair[1])).unzip()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_sizes() {
        assert_eq!(PixelFormat::I420.frame_size(1920, 1080), 1920 * 1080 * 3 / 2);
        assert_eq!(PixelFormat::NV12.frame_size(4, 2), 12);
        assert_eq!(PixelFormat::P010.frame_size(4, 2), 24);
        assert_eq!(PixelFormat::YUY2.frame_size(4, 2), 16);
        assert_eq!(PixelFormat::Yuv422H.frame_size(4, 2), 16);
        assert_eq!(PixelFormat::Yuv444P.frame_size(4, 2), 24);
        // Odd dimensions round chroma up.
        assert_eq!(PixelFormat::I420.frame_size(3, 3), 9 + 2 * 4);
    }

    #[test]
    fn unknown_and_unmapped_formats() {
        assert_eq!(PixelFormat::from_name("BGRA"), None);
        assert_eq!(PixelFormat::YV12.ffmpeg_pix_fmt(), None);
        assert_eq!(PixelFormat::YV12.gst_format(), Some("YV12"));
        assert_eq!(PixelFormat::from_name("422H"), Some(PixelFormat::Yuv422H));
        assert_eq!(PixelFormat::Yuv422H.to_string(), "422H");
    }

    #[test]
    fn split_i420_and_yv12() {
        let frame: Vec<u8> = (0u8..12).collect();
        let i420 = PixelFormat::I420.split_frame(&frame, 4, 2);
        assert_eq!(i420.y, vec![0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(i420.u, vec![8, 9]);
        assert_eq!(i420.v, vec![10, 11]);

        let yv12 = PixelFormat::YV12.split_frame(&frame, 4, 2);
        assert_eq!(yv12.u, vec![10, 11]);
        assert_eq!(yv12.v, vec![8, 9]);
    }

    #[test]
    fn split_nv12() {
        let frame = [1, 1, 1, 1, 1, 1, 1, 1, 10, 20, 11, 21];
        let planes = PixelFormat::NV12.split_frame(&frame, 4, 2);
        assert_eq!(planes.u, vec![10, 11]);
        assert_eq!(planes.v, vec![20, 21]);
    }

    #[test]
    fn split_p010() {
        let mut frame = Vec::new();
        for _ in 0..8 {
            frame.extend_from_slice(&(1023u16 << 6).to_le_bytes());
        }
        for sample in [512u16, 64, 100, 200] {
            frame.extend_from_slice(&(sample << 6).to_le_bytes());
        }
        let planes = PixelFormat::P010.split_frame(&frame, 4, 2);
        assert_eq!(planes.y, vec![1023; 8]);
        assert_eq!(planes.u, vec![512, 100]);
        assert_eq!(planes.v, vec![64, 200]);
    }

    #[test]
    fn split_yuy2() {
        let frame = [1, 50, 2, 60, 3, 51, 4, 61, 5, 52, 6, 62, 7, 53, 8, 63];
        let planes = PixelFormat::YUY2.split_frame(&frame, 4, 2);
        assert_eq!(planes.y, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(planes.u, vec![50, 51, 52, 53]);
        assert_eq!(planes.v, vec![60, 61, 62, 63]);
    }
}
