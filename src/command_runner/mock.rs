// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::collections::VecDeque;
use std::fs;
use std::os::unix::prelude::ExitStatusExt;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::process::Output;

use crate::command_runner::CommandRunner;

// For any member variable x in MockCommandInput:
// x = Some(_) means that we would check the correspondence;
// otherwise, we don't really care about its exact value.
pub struct MockCommandInput {
    pub program: Option<String>,
    pub args: Option<Vec<String>>,
}

impl MockCommandInput {
    pub fn new(program: &str, args: Vec<&str>) -> Self {
        Self {
            program: Some(program.to_owned()),
            args: Some(args.iter().map(|&s| s.into()).collect()),
        }
    }

    pub fn program(program: &str) -> Self {
        Self {
            program: Some(program.to_owned()),
            args: None,
        }
    }
}

pub struct MockCommandOutput {
    pub result: Result<Output, std::io::Error>,
    // Files the "process" produces before returning.
    pub files: Vec<(PathBuf, Vec<u8>)>,
}

impl MockCommandOutput {
    pub fn new(exit_status: i32, out: &str, err: &str) -> Self {
        Self {
            result: Ok(Output {
                // Raw wait status: the exit code lives in the second byte.
                status: ExitStatus::from_raw(exit_status << 8),
                stdout: out.as_bytes().to_vec(),
                stderr: err.as_bytes().to_vec(),
            }),
            files: Vec::new(),
        }
    }

    pub fn success() -> Self {
        Self::new(0, "", "")
    }

    pub fn not_found() -> Self {
        Self {
            result: Err(std::io::Error::from(std::io::ErrorKind::NotFound)),
            files: Vec::new(),
        }
    }

    pub fn writing(mut self, path: impl Into<PathBuf>, contents: Vec<u8>) -> Self {
        self.files.push((path.into(), contents));
        self
    }
}

pub struct MockCommandRunner {
    expectations: VecDeque<(MockCommandInput, MockCommandOutput)>,
}

impl Default for MockCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCommandRunner {
    pub fn new() -> Self {
        MockCommandRunner {
            expectations: VecDeque::new(),
        }
    }

    pub fn add_expectation(&mut self, inp: MockCommandInput, out: MockCommandOutput) {
        self.expectations.push_back((inp, out));
    }

    pub fn expect_program(&mut self, program: &str, out: MockCommandOutput) {
        self.add_expectation(MockCommandInput::program(program), out);
    }
}

impl CommandRunner for MockCommandRunner {
    fn run(&mut self, program: &str, args: &[String]) -> Result<Output, std::io::Error> {
        let (inp, out) = self
            .expectations
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected command: {} {}", program, args.join(" ")));
        if let Some(inp_program) = inp.program {
            assert_eq!(program, inp_program);
        }
        if let Some(inp_args) = inp.args {
            assert_eq!(args, inp_args.as_slice());
        }
        for (path, contents) in out.files {
            fs::write(&path, contents).expect("failed to write mock output");
        }
        out.result
    }
}

impl Drop for MockCommandRunner {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            assert!(
                self.expectations.is_empty(),
                "{} expected commands were never run",
                self.expectations.len()
            );
        }
    }
}
