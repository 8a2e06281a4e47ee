// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Run summary and the JSON results file.

use std::fmt;
use std::fs;
use std::path::Path;

use chrono::prelude::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::error::FitsError;
use crate::error::Result;
use crate::runner::Outcome;
use crate::runner::TestResult;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
}

impl Summary {
    pub fn from_results(results: &[TestResult]) -> Self {
        let mut summary = Summary {
            total: results.len(),
            ..Default::default()
        };
        for result in results {
            match result.outcome {
                Outcome::Passed => summary.passed += 1,
                Outcome::Skipped { .. } => summary.skipped += 1,
                Outcome::Failed { .. } => summary.failed += 1,
            }
            summary.duration_ms += result.duration_ms;
        }
        summary
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} passed / {} failed / {} skipped ({} tests, {:.1}s)",
            self.passed,
            self.failed,
            self.skipped,
            self.total,
            self.duration_ms as f64 / 1000.0
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// RFC 3339 time the report was produced.
    pub timestamp: String,
    pub platform: Option<String>,
    pub summary: Summary,
    pub results: Vec<TestResult>,
}

impl Report {
    pub fn new(platform: Option<String>, results: Vec<TestResult>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            platform,
            summary: Summary::from_results(&results),
            results,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0
    }

    pub fn failed(&self) -> impl Iterator<Item = &TestResult> {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Failed { .. }))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| FitsError::Io(format!("Failed to create {:?}: {}", parent, e)))?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| FitsError::Io(format!("Failed to serialize results: {}", e)))?;
        fs::write(path, content)
            .map_err(|e| FitsError::Io(format!("Failed to write results {:?}: {}", path, e)))?;
        log::info!("Results written to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    use crate::baseline::Metrics;

    fn result(id: &str, outcome: Outcome) -> TestResult {
        TestResult {
            id: id.to_string(),
            outcome,
            details: Metrics::new(),
            started: "2026-01-01T00:00:00+00:00".to_string(),
            duration_ms: 500,
        }
    }

    fn sample() -> Report {
        Report::new(
            Some("TGL".to_string()),
            vec![
                result("a", Outcome::Passed),
                result(
                    "b",
                    Outcome::Failed {
                        error: "md5 mismatch".to_string(),
                    },
                ),
                result(
                    "c",
                    Outcome::Skipped {
                        reason: "requires ffmpeg".to_string(),
                    },
                ),
                result("d", Outcome::Passed),
            ],
        )
    }

    #[test]
    fn summary_counts() {
        let report = sample();
        assert_eq!(
            report.summary,
            Summary {
                total: 4,
                passed: 2,
                failed: 1,
                skipped: 1,
                duration_ms: 2000,
            }
        );
        assert!(report.has_failures());
        assert_eq!(report.failed().map(|r| r.id.as_str()).collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(
            report.summary.to_string(),
            "2 passed / 1 failed / 1 skipped (4 tests, 2.0s)"
        );
    }

    #[test]
    fn written_report_reads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/results.json");
        let report = sample();
        report.write(&path).unwrap();
        let read: Report = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(read, report);
    }
}
