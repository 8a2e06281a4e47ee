// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! State shared by all test instances of a run.

use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use chrono::prelude::Utc;
use serde_json::Value;

use crate::artifacts::ArtifactStore;
use crate::baseline::Baseline;
use crate::baseline::Metrics;
use crate::config::Config;
use crate::error::Result;

pub struct Media {
    pub config: Config,
    pub artifacts: ArtifactStore,
    pub baseline: Baseline,
    // Capability check results, keyed by check name.
    capabilities: HashMap<String, bool>,
    test_id: String,
    details: Metrics,
}

impl Media {
    pub fn new(config: Config) -> Result<Self> {
        let mut artifacts = ArtifactStore::new(&config.artifact_dir);
        if config.command_logs {
            // Separate runs sharing an artifact directory get their own log.
            let name = format!("commands_{}.log", Utc::now().format("%Y-%m-%d_%H:%M:%S"));
            artifacts = artifacts.with_command_log(&name);
        }

        let mut baseline = match &config.baseline {
            Some(path) => Baseline::load(path)?,
            None => Baseline::new(),
        };
        if config.rebase() {
            baseline.enable_rebase();
        }

        Ok(Self {
            config,
            artifacts,
            baseline,
            capabilities: HashMap::new(),
            test_id: String::new(),
            details: Metrics::new(),
        })
    }

    pub fn capability(&self, check: &str) -> Option<bool> {
        self.capabilities.get(check).copied()
    }

    pub fn set_capability(&mut self, check: &str, present: bool) {
        self.capabilities.insert(check.to_string(), present);
    }

    pub fn begin_test(&mut self, test_id: &str) {
        self.test_id = test_id.to_string();
        self.details.clear();
    }

    /// Ends the current test and hands back the details it recorded.
    pub fn finish_test(&mut self) -> Metrics {
        self.test_id.clear();
        std::mem::take(&mut self.details)
    }

    pub fn set_test_detail(&mut self, name: &str, value: impl Into<Value>) {
        self.details.insert(name.to_string(), value.into());
    }

    pub fn test_artifact(&self, name: &str) -> Result<PathBuf> {
        self.artifacts.test_artifact(name)
    }

    pub fn purge_test_artifact(&self, path: &Path) -> Result<()> {
        self.artifacts.purge_test_artifact(path)
    }

    /// Compares `metrics` with the current test's baseline under `context`.
    pub fn check_result<F>(&mut self, context: &[String], metrics: Metrics, compare: F) -> Result<()>
    where
        F: FnMut(&str, Option<&Value>, &Value) -> Result<()>,
    {
        self.baseline
            .check_result(&self.test_id, context, metrics, compare)
    }

    /// Writes rebased metrics, if this run collected any.
    pub fn finish_run(&self) -> Result<()> {
        match &self.config.rebase_output {
            Some(path) => self.baseline.save_rebase(path),
            None => Ok(()),
        }
    }
}
