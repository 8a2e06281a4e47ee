// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Encoder tests driving GStreamer's VA-API plugins through `gst-launch-1.0`.

pub mod avc;
pub mod encoder;
