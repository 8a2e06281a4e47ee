// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::process::Command;
use std::process::Output;

use super::CommandRunner;

pub struct RealCommandRunner;

impl CommandRunner for RealCommandRunner {
    fn run(&mut self, program: &str, args: &[String]) -> Result<Output, std::io::Error> {
        Command::new(program).args(args).output()
    }
}
