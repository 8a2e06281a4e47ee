// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use crate::command_runner::CommandRunner;
use crate::media::Media;

mod real;
pub use real::*;

#[cfg(test)]
pub(crate) mod mock;

/// Everything a test instance reaches outside of itself: the external
/// processes it runs and the shared run state.
pub trait Context {
    type CommandRunner: CommandRunner;
    fn cmd_runner(&mut self) -> &mut Self::CommandRunner;
    fn media(&mut self) -> &mut Media;
}
