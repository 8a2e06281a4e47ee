// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use super::Context;
use crate::command_runner::RealCommandRunner;
use crate::media::Media;

pub struct RealContext {
    cmd_runner: RealCommandRunner,
    media: Media,
}

impl RealContext {
    pub fn new(media: Media) -> Self {
        Self {
            cmd_runner: RealCommandRunner,
            media,
        }
    }
}

impl Context for RealContext {
    type CommandRunner = RealCommandRunner;
    fn cmd_runner(&mut self) -> &mut Self::CommandRunner {
        &mut self.cmd_runner
    }
    fn media(&mut self) -> &mut Media {
        &mut self.media
    }
}
