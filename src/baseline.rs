// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Stored reference metrics.
//!
//! A baseline file is a JSON object keyed by test ID, optionally extended by
//! `.`-separated context entries, whose values map metric names to their
//! reference values:
//!
//! ```json
//! { "ffmpeg-qsv/vpp/saturation/test_default(case=a,level=80)": { "psnr": [...] } }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde_json::Value;

use crate::error::FitsError;
use crate::error::Result;

pub type Metrics = BTreeMap<String, Value>;

#[derive(Debug, Default)]
pub struct Baseline {
    references: BTreeMap<String, Metrics>,
    // Metrics recorded in rebase mode, written out by `save_rebase`.
    rebased: Option<BTreeMap<String, Metrics>>,
}

/// Key of the record for `test_id` under `context`.
pub fn baseline_key(test_id: &str, context: &[String]) -> String {
    let mut key = test_id.to_string();
    for entry in context {
        key.push('.');
        key.push_str(entry);
    }
    key
}

impl Baseline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the store at `path`. A missing file yields an empty store, so
    /// every lookup reports the reference as absent.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::warn!("Baseline {:?} does not exist", path);
                return Ok(Self::new());
            }
            Err(e) => {
                return Err(FitsError::Io(format!(
                    "Failed to read baseline {:?}: {}",
                    path, e
                )))
            }
        };
        let references = serde_json::from_str(&content).map_err(|e| FitsError::Parse {
            file: path.to_path_buf(),
            details: e.to_string(),
        })?;
        Ok(Self {
            references,
            rebased: None,
        })
    }

    /// Switches to rebase mode: comparisons are skipped and actual values are
    /// collected instead.
    pub fn enable_rebase(&mut self) {
        self.rebased = Some(BTreeMap::new());
    }

    pub fn lookup(&self, key: &str) -> Option<&Metrics> {
        self.references.get(key)
    }

    pub fn insert(&mut self, key: &str, metrics: Metrics) {
        self.references.insert(key.to_string(), metrics);
    }

    /// Compares each of `metrics` with its reference through `compare`,
    /// which receives the metric name, the reference (if any) and the actual
    /// value.
    pub fn check_result<F>(
        &mut self,
        test_id: &str,
        context: &[String],
        metrics: Metrics,
        mut compare: F,
    ) -> Result<()>
    where
        F: FnMut(&str, Option<&Value>, &Value) -> Result<()>,
    {
        let key = baseline_key(test_id, context);
        if let Some(rebased) = self.rebased.as_mut() {
            log::info!("Rebasing {}", key);
            rebased.entry(key).or_default().extend(metrics);
            return Ok(());
        }

        let reference = self.lookup(&key);
        for (name, actual) in &metrics {
            let expected = reference.and_then(|r| r.get(name));
            compare(name, expected, actual).map_err(|e| match e {
                // Attach the lookup key the predicate did not know about.
                FitsError::BaselineMissing { metric, .. } => FitsError::BaselineMissing {
                    key: key.clone(),
                    metric,
                },
                e => e,
            })?;
        }
        Ok(())
    }

    /// Writes the values collected in rebase mode, merged over the loaded
    /// references, to `path`.
    pub fn save_rebase(&self, path: &Path) -> Result<()> {
        let Some(rebased) = &self.rebased else {
            return Ok(());
        };
        let mut merged = self.references.clone();
        for (key, metrics) in rebased {
            merged.entry(key.clone()).or_default().extend(metrics.clone());
        }
        let content = serde_json::to_string_pretty(&merged)
            .map_err(|e| FitsError::Io(format!("Failed to serialize baseline: {}", e)))?;
        fs::write(path, content + "\n")
            .map_err(|e| FitsError::Io(format!("Failed to write baseline {:?}: {}", path, e)))?;
        log::info!("Wrote {} rebased records to {:?}", rebased.len(), path);
        Ok(())
    }
}

/// Shorthand for predicates reporting a missing reference.
pub fn missing(metric: &str) -> FitsError {
    FitsError::BaselineMissing {
        key: String::new(),
        metric: metric.to_string(),
    }
}
