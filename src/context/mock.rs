// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::path::Path;

use super::Context;
use crate::command_runner::MockCommandRunner;
use crate::config::Config;
use crate::media::Media;

pub(crate) struct MockContext {
    cmd_runner: MockCommandRunner,
    media: Media,
}

impl MockContext {
    /// A context writing artifacts to `dir`, with no baseline, no platform
    /// and command logs disabled.
    pub fn new(dir: &Path) -> Self {
        let config = Config {
            artifact_dir: dir.to_path_buf(),
            command_logs: false,
            ..Default::default()
        };
        Self::with_config(config)
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            cmd_runner: MockCommandRunner::new(),
            media: Media::new(config).expect("failed to set up media"),
        }
    }
}

impl Context for MockContext {
    type CommandRunner = MockCommandRunner;
    fn cmd_runner(&mut self) -> &mut Self::CommandRunner {
        &mut self.cmd_runner
    }
    fn media(&mut self) -> &mut Media {
        &mut self.media
    }
}
