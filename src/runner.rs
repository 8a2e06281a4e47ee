// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Sequential execution of test instances.

use std::time::Instant;

use chrono::prelude::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::baseline::Metrics;
use crate::context::Context;
use crate::error::FitsError;
use crate::error::Result;
use crate::report::Report;
use crate::suite::Specs;
use crate::suite::TestCase;

/// Final state of one test instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum Outcome {
    Passed,
    Skipped { reason: String },
    Failed { error: String },
}

impl Outcome {
    pub fn from_result(result: &Result<()>) -> Self {
        match result {
            Ok(()) => Outcome::Passed,
            Err(FitsError::Skip(reason)) => Outcome::Skipped {
                reason: reason.clone(),
            },
            Err(err) => Outcome::Failed {
                error: err.to_string(),
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub id: String,
    #[serde(flatten)]
    pub outcome: Outcome,
    /// Metric values recorded while the test ran.
    pub details: Metrics,
    /// RFC 3339 start time.
    pub started: String,
    pub duration_ms: u64,
}

/// Runs one instance. Whatever happens is captured in the result.
pub fn run_case(ctx: &mut impl Context, specs: &Specs, case: &TestCase) -> TestResult {
    let id = case.id();
    let started = Utc::now();
    let timer = Instant::now();

    log::info!("Running {}", id);
    ctx.media().begin_test(&id);
    let result = case.run(ctx, specs);
    let details = ctx.media().finish_test();
    let outcome = Outcome::from_result(&result);

    match &outcome {
        Outcome::Passed => log::info!("PASSED {}", id),
        Outcome::Skipped { reason } => log::info!("SKIPPED {}: {}", id, reason),
        Outcome::Failed { error } => log::error!("FAILED {}: {}", id, error),
    }

    TestResult {
        id,
        outcome,
        details,
        started: started.to_rfc3339(),
        duration_ms: timer.elapsed().as_millis() as u64,
    }
}

/// Runs `cases` in order, then writes any rebased baseline. A failing
/// instance never stops the ones after it.
pub fn run_all(ctx: &mut impl Context, specs: &Specs, cases: &[TestCase]) -> Result<Report> {
    let results: Vec<TestResult> = cases
        .iter()
        .map(|case| run_case(ctx, specs, case))
        .collect();
    ctx.media().finish_run()?;
    let platform = ctx.media().config.platform.clone();
    Ok(Report::new(platform, results))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use serde_json::Value;
    use tempfile::TempDir;

    use crate::command_runner::MockCommandOutput;
    use crate::config::Config;
    use crate::context::mock::MockContext;
    use crate::parameters::SaturationParams;

    fn specs(dir: &TempDir) -> Specs {
        fs::create_dir_all(dir.path().join("vpp")).unwrap();
        fs::write(
            dir.path().join("vpp/saturation.json"),
            r#"{ "tiny": { "source": "tiny.yuv", "width": 4, "height": 2,
                           "format": "NV12", "frames": 2 } }"#,
        )
        .unwrap();
        Specs::load(dir.path()).unwrap()
    }

    fn case(level: u32) -> TestCase {
        TestCase::SaturationDefault(SaturationParams {
            case: "tiny".to_string(),
            level,
        })
    }

    #[test]
    fn outcomes_from_results() {
        assert_eq!(Outcome::from_result(&Ok(())), Outcome::Passed);
        assert_eq!(
            Outcome::from_result(&Err(FitsError::skip("requires ffmpeg"))),
            Outcome::Skipped {
                reason: "requires ffmpeg".to_string()
            }
        );
        assert!(matches!(
            Outcome::from_result(&Err(FitsError::Io("boom".to_string()))),
            Outcome::Failed { .. }
        ));
    }

    #[test]
    fn missing_tool_skips_every_instance() {
        let dir = TempDir::new().unwrap();
        let specs = specs(&dir);
        let mut ctx = MockContext::new(&dir.path().join("artifacts"));
        // The capability result is cached, so only the first instance runs it.
        ctx.cmd_runner()
            .expect_program("ffmpeg", MockCommandOutput::not_found());

        let report = run_all(&mut ctx, &specs, &[case(0), case(50)]).unwrap();
        assert_eq!(report.summary.skipped, 2);
        assert_eq!(report.summary.failed, 0);
        assert!(!report.has_failures());
        assert_eq!(
            report.results[0].id,
            "ffmpeg-qsv/vpp/saturation/test_default(case=tiny,level=0)"
        );
    }

    #[test]
    fn platform_is_reported() {
        let dir = TempDir::new().unwrap();
        let specs = specs(&dir);
        let config = Config {
            artifact_dir: dir.path().join("artifacts"),
            command_logs: false,
            platform: Some("TGL".to_string()),
            ..Default::default()
        };
        let mut ctx = MockContext::with_config(config);
        let report = run_all(&mut ctx, &specs, &[]).unwrap();
        assert_eq!(report.platform.as_deref(), Some("TGL"));
        assert_eq!(report.summary.total, 0);
    }

    #[test]
    fn serialized_result_is_flat() {
        let result = TestResult {
            id: "a".to_string(),
            outcome: Outcome::Skipped {
                reason: "requires gstreamer".to_string(),
            },
            details: Metrics::new(),
            started: "2026-01-01T00:00:00+00:00".to_string(),
            duration_ms: 3,
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["outcome"], Value::from("skipped"));
        assert_eq!(value["reason"], Value::from("requires gstreamer"));
    }
}
