// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::fs;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use crate::error::FitsError;
use crate::error::Result;

/// Owns the directory where tests write their output media and logs.
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    dir: PathBuf,
    command_log: Option<PathBuf>,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            command_log: None,
        }
    }

    /// Also append the output of every external command to `name` in the
    /// artifact directory.
    pub fn with_command_log(mut self, name: &str) -> Self {
        self.command_log = Some(self.dir.join(name));
        self
    }

    /// Path for the artifact `name`, creating the artifact directory on
    /// demand.
    pub fn test_artifact(&self, name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            FitsError::Io(format!(
                "Failed to create artifact directory {:?}: {}",
                self.dir, e
            ))
        })?;
        Ok(self.dir.join(name))
    }

    /// Removes an artifact. A file that is already gone is not an error.
    pub fn purge_test_artifact(&self, path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => {
                log::debug!("Purged {:?}", path);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FitsError::Io(format!("Failed to remove {:?}: {}", path, e))),
        }
    }

    /// Write to the command log in append mode
    pub fn log_command_output(&self, output: &str) {
        if let Some(path) = &self.command_log {
            if let Err(err) = fs::create_dir_all(&self.dir) {
                log::error!("Failed to create {:?}: {}", self.dir, err);
                return;
            }
            match OpenOptions::new().create(true).append(true).open(path) {
                Ok(mut file) => {
                    if let Err(err) = file.write_all(output.as_bytes()) {
                        log::error!("Failed to append output to {:?}: {}", path, err);
                    }
                }
                Err(err) => log::error!("Failed to open command log {:?}: {}", path, err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    #[test]
    fn creates_directory_and_purges() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path().join("out"));
        let path = store.test_artifact("a.yuv").unwrap();
        assert!(dir.path().join("out").is_dir());

        fs::write(&path, b"x").unwrap();
        store.purge_test_artifact(&path).unwrap();
        assert!(!path.exists());
        // Purging twice is fine.
        store.purge_test_artifact(&path).unwrap();
    }

    #[test]
    fn appends_command_log() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path()).with_command_log("commands.log");
        store.log_command_output("first\n");
        store.log_command_output("second\n");
        let log = fs::read_to_string(dir.path().join("commands.log")).unwrap();
        assert_eq!(log, "first\nsecond\n");
    }

    #[test]
    fn unopenable_command_log_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        // A directory in place of the log makes every open fail.
        fs::create_dir(dir.path().join("commands.log")).unwrap();
        let store = ArtifactStore::new(dir.path()).with_command_log("commands.log");
        store.log_command_output("lost\n");
        assert!(dir.path().join("commands.log").is_dir());
        // Artifacts still work.
        store.test_artifact("a.yuv").unwrap();
    }
}
