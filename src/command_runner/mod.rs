// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::process::Output;

mod real;
pub use real::*;

#[cfg(test)]
mod mock;
#[cfg(test)]
pub use mock::*;

pub trait CommandRunner {
    fn run(&mut self, program: &str, args: &[String]) -> Result<Output, std::io::Error>;
}
