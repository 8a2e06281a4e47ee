// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::process::Output;

use crate::command::Invocation;
use crate::command_runner::CommandRunner;
use crate::context::Context;
use crate::error::FitsError;
use crate::error::Result;

/// Runs `invocation` to completion. A non-zero exit is a hard failure
/// carrying the process's stderr.
pub fn call(ctx: &mut impl Context, invocation: &Invocation) -> Result<Output> {
    let command_str = invocation.to_string();
    log::info!("Executing command: {}", command_str);

    let output = ctx
        .cmd_runner()
        .run(&invocation.program, &invocation.args)
        .map_err(|err| {
            FitsError::Io(format!(
                "Error executing command: {} with error: {:?}",
                command_str, err
            ))
        })?;

    let stdout_output = String::from_utf8_lossy(&output.stdout);
    let stderr_output = String::from_utf8_lossy(&output.stderr);
    ctx.media().artifacts.log_command_output(&format!(
        "$ {}\n{}{}",
        command_str, stdout_output, stderr_output
    ));

    if output.status.success() {
        log::info!("Command succeeded: {}", command_str);
        Ok(output)
    } else {
        log::error!(
            "Command: {} failed with error: {:?}",
            command_str,
            stderr_output
        );
        Err(FitsError::CommandFailed {
            command: command_str,
            status: output.status.to_string(),
            stderr: stderr_output.into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use tempfile::TempDir;

    use crate::command_runner::MockCommandInput;
    use crate::command_runner::MockCommandOutput;
    use crate::config::Config;
    use crate::context::mock::MockContext;

    #[test]
    fn success_returns_output() {
        let dir = TempDir::new().unwrap();
        let mut ctx = MockContext::new(dir.path());
        ctx.cmd_runner().add_expectation(
            MockCommandInput::new("tool", vec!["-a", "b c"]),
            MockCommandOutput::new(0, "ok", ""),
        );

        let inv = Invocation::new("tool").arg("-a").arg("b c");
        let output = call(&mut ctx, &inv).unwrap();
        assert_eq!(output.stdout, b"ok");
    }

    #[test]
    fn non_zero_exit_is_failure_with_stderr() {
        let dir = TempDir::new().unwrap();
        let mut ctx = MockContext::new(dir.path());
        ctx.cmd_runner()
            .expect_program("tool", MockCommandOutput::new(1, "", "no device"));

        match call(&mut ctx, &Invocation::new("tool")) {
            Err(FitsError::CommandFailed { command, stderr, .. }) => {
                assert_eq!(command, "tool");
                assert_eq!(stderr, "no device");
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn spawn_failure_is_io_error() {
        let dir = TempDir::new().unwrap();
        let mut ctx = MockContext::new(dir.path());
        ctx.cmd_runner()
            .expect_program("missing", MockCommandOutput::not_found());
        assert!(matches!(
            call(&mut ctx, &Invocation::new("missing")),
            Err(FitsError::Io(_))
        ));
    }

    #[test]
    fn output_goes_to_command_log() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            artifact_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let mut ctx = MockContext::with_config(config);
        ctx.cmd_runner()
            .expect_program("tool", MockCommandOutput::new(0, "hello\n", ""));
        call(&mut ctx, &Invocation::new("tool").arg("x")).unwrap();

        let logs: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(logs.len(), 1);
        assert_eq!(fs::read_to_string(&logs[0]).unwrap(), "$ tool x\nhello\n");
    }
}
