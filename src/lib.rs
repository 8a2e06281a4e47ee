// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Conformance and regression tests for hardware-accelerated media pipelines.
//!
//! Suites drive external tools (`ffmpeg`, `gst-launch-1.0`) and judge their
//! raw output against fidelity, reproducibility and bitrate criteria.

pub mod artifacts;
/// Baseline reference metrics and the comparison entry point.
pub mod baseline;
/// Capability checks deciding whether a test can run here.
pub mod caps;
pub mod command;
pub mod command_runner;
pub mod config;
pub mod context;
pub mod error;
/// Runs external commands and logs their output.
pub mod exec;
/// Video processing tests through ffmpeg's QSV path.
pub mod ffmpeg_qsv;
pub mod format;
/// Encoder tests through GStreamer VA-API elements.
pub mod gst_vaapi;
pub mod media;
pub mod metrics;
pub mod parameters;
pub mod report;
pub mod runner;
pub mod spec;
pub mod suite;
