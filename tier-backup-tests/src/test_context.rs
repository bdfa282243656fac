//! Test context and harness for backup tests
//!
//! Provides a unified context for setting up and tearing down test environments.

use crate::config_builder::ConfigBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tier_backup::config::{resolve_config, Config, ResolvedConfig};
use tier_backup::managers::backup::BackupManager;
use tier_backup::managers::rotation::Rotator;
use tier_backup::utils::archive_ops::mock::MockArchiveOps;
use tier_backup::utils::manifest::Manifest;
use tier_backup::utils::reporter::mock::RecordingReporter;

/// Test context that manages test resources and provides common utilities
pub struct TestContext {
    /// Temporary directory for test files
    temp_dir: TempDir,
    /// The test configuration
    config: Config,
}

impl TestContext {
    /// Create a test context with a minimal configuration
    pub fn with_minimal_config() -> Self {
        Self::from_builder(ConfigBuilder::minimal())
    }

    /// Create a test context from a ConfigBuilder
    pub fn from_builder(builder: ConfigBuilder) -> Self {
        let (config, temp_dir) = builder.persist();
        Self { temp_dir, config }
    }

    /// Get the temporary directory path
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolved configuration for building managers
    pub fn resolved(&self) -> ResolvedConfig {
        resolve_config(&self.config).expect("Failed to resolve test config")
    }

    /// Destination directory, created on first use
    pub fn destination(&self) -> PathBuf {
        let destination = self.config.backup.destination.clone();
        fs::create_dir_all(&destination).expect("Failed to create destination");
        destination
    }

    /// Backup manager wired to mocks
    pub fn manager(&self, archiver: &MockArchiveOps, reporter: &RecordingReporter) -> BackupManager {
        BackupManager::with_components(
            self.resolved(),
            Arc::new(archiver.clone()),
            Arc::new(reporter.clone()),
        )
    }

    /// Rotator wired to a recording reporter
    pub fn rotator(&self, reporter: &RecordingReporter) -> Rotator {
        Rotator::new(&self.resolved(), Arc::new(reporter.clone()))
    }

    /// Create a file artifact in the destination directory
    pub fn create_artifact(&self, name: &str) -> PathBuf {
        let path = self.destination().join(name);
        fs::write(&path, format!("artifact {}", name)).expect("Failed to write artifact");
        path
    }

    /// Create a directory artifact in the destination directory
    pub fn create_directory_artifact(&self, name: &str) -> PathBuf {
        let path = self.destination().join(name);
        fs::create_dir_all(path.join("data")).expect("Failed to create artifact dir");
        fs::write(path.join("data/file.txt"), name).expect("Failed to write artifact file");
        path
    }

    /// Create artifacts in order with distinct creation times
    pub fn create_artifacts_in_order(&self, names: &[&str]) -> Vec<PathBuf> {
        names
            .iter()
            .map(|name| {
                let path = self.create_artifact(name);
                std::thread::sleep(Duration::from_millis(20));
                path
            })
            .collect()
    }

    /// Sorted names in the destination, excluding the manifest
    pub fn artifact_names(&self) -> Vec<String> {
        let destination = &self.config.backup.destination;
        if !destination.exists() {
            return Vec::new();
        }

        let mut names: Vec<String> = fs::read_dir(destination)
            .expect("Failed to read destination")
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|name| !Manifest::is_manifest_file(name, &self.config.backup.project))
            .collect();
        names.sort();
        names
    }

    /// The project's manifest as currently stored
    pub fn manifest(&self) -> Manifest {
        let project = &self.config.backup.project;
        Manifest::load(
            &Manifest::path_for(&self.config.backup.destination, project),
            project,
        )
        .expect("Failed to load manifest")
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::with_minimal_config()
    }
}

/// Extension trait for assertion helpers
pub trait ResultAssertions<T> {
    /// Assert that the result is Ok and return the value
    fn assert_ok(self) -> T;

    /// Assert that the result is Err and the error message contains the given string
    fn assert_err_contains(self, needle: &str);
}

impl<T: std::fmt::Debug, E: std::fmt::Debug> ResultAssertions<T> for Result<T, E> {
    fn assert_ok(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    }

    fn assert_err_contains(self, needle: &str) {
        match self {
            Ok(v) => panic!("Expected Err containing '{}', got Ok: {:?}", needle, v),
            Err(e) => {
                let err_msg = format!("{:?}", e);
                assert!(
                    err_msg.contains(needle),
                    "Error '{}' does not contain '{}'",
                    err_msg,
                    needle
                );
            }
        }
    }
}
