//! Fluent API for building test configurations
//!
//! Provides a builder pattern for creating test configurations with sensible defaults.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tier_backup::config::{
    BackupMethod, BackupSection, Config, LoggingSection, MethodConfig, MethodsConfig,
    RetentionPolicy,
};

/// Builder for creating test configurations
pub struct ConfigBuilder {
    temp_dir: TempDir,
    backup: BackupSection,
    retention: RetentionPolicy,
    methods: MethodsConfig,
    logging: LoggingSection,
}

impl ConfigBuilder {
    /// Create a new ConfigBuilder with a populated source directory and no
    /// backup method selected
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let source = temp_dir.path().join("source");
        fs::create_dir_all(source.join("assets")).expect("Failed to create source dir");
        fs::write(source.join("index.html"), "<h1>test</h1>").expect("Failed to write source file");
        fs::write(source.join("assets/app.js"), "console.log(1)").expect("Failed to write source file");

        let backup = BackupSection {
            project: "testapp".to_string(),
            source,
            destination: temp_dir.path().join("backups"),
            extension: ".tar.gz".to_string(),
            reuse_window_seconds: 360,
        };

        Self {
            temp_dir,
            backup,
            retention: RetentionPolicy::default(),
            methods: MethodsConfig::default(),
            logging: LoggingSection::default(),
        }
    }

    /// Create a minimal config using the tar method
    pub fn minimal() -> Self {
        Self::new().with_method(BackupMethod::Tar)
    }

    /// Enable a backup method (does not disable the others)
    pub fn with_method(mut self, method: BackupMethod) -> Self {
        let settings = MethodConfig {
            enabled: true,
            command: None,
        };
        match method {
            BackupMethod::Tar => self.methods.tar = settings,
            BackupMethod::Rsync => self.methods.rsync = settings,
        }
        self
    }

    /// Disable every backup method
    pub fn without_methods(mut self) -> Self {
        self.methods = MethodsConfig::default();
        self
    }

    /// Override the command template of an enabled method
    pub fn with_command(mut self, method: BackupMethod, command: &str) -> Self {
        let settings = match method {
            BackupMethod::Tar => &mut self.methods.tar,
            BackupMethod::Rsync => &mut self.methods.rsync,
        };
        settings.command = Some(command.to_string());
        self
    }

    pub fn with_project(mut self, project: &str) -> Self {
        self.backup.project = project.to_string();
        self
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.backup.extension = extension.to_string();
        self
    }

    pub fn with_reuse_window(mut self, seconds: u64) -> Self {
        self.backup.reuse_window_seconds = seconds;
        self
    }

    /// Set the log directory
    pub fn with_log_dir(mut self, path: &Path) -> Self {
        self.logging.directory = Some(path.to_path_buf());
        self
    }

    /// Set the retention policy
    pub fn with_retention(mut self, retention: RetentionPolicy) -> Self {
        self.retention = retention;
        self
    }

    pub fn hourly(mut self, count: u32) -> Self {
        self.retention.hourly = count;
        self
    }

    pub fn daily(mut self, count: u32) -> Self {
        self.retention.daily = count;
        self
    }

    pub fn weekly(mut self, count: u32) -> Self {
        self.retention.weekly = count;
        self
    }

    pub fn monthly(mut self, count: u32) -> Self {
        self.retention.monthly = count;
        self
    }

    pub fn yearly(mut self, count: u32) -> Self {
        self.retention.yearly = count;
        self
    }

    /// Get the temp directory path
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the destination path
    pub fn destination(&self) -> PathBuf {
        self.backup.destination.clone()
    }

    fn config(&self) -> Config {
        Config {
            backup: self.backup.clone(),
            retention: self.retention,
            methods: self.methods.clone(),
            logging: self.logging.clone(),
        }
    }

    /// Build the Config (the temp directory is removed on return)
    pub fn build(self) -> Config {
        self.config()
    }

    /// Keep the temp directory alive alongside the config
    pub fn persist(self) -> (Config, TempDir) {
        let config = self.config();
        (config, self.temp_dir)
    }

    /// Write the config as TOML into the temp directory
    pub fn write_toml(self) -> (PathBuf, Config, TempDir) {
        let (config, temp_dir) = self.persist();
        let path = temp_dir.path().join("tier-backup.toml");
        let contents = toml::to_string_pretty(&config).expect("Failed to serialize config");
        fs::write(&path, contents).expect("Failed to write config");
        (path, config, temp_dir)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
