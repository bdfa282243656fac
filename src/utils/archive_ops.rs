//! Archiver operations abstraction for testability
//!
//! Wraps the selected backup strategy and a command executor behind a trait
//! so the backup manager can be exercised without spawning `tar` or `rsync`.
//! Invocation is synchronous and fail-fast: no retries, no timeout.

use crate::config::{BackupMethod, ResolvedConfig};
use crate::strategies::{self, BackupStrategy};
use crate::utils::executor::{CommandExecutor, RealExecutor};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("Archiver '{program}' not found on this system: {message}")]
    ToolNotFound { program: String, message: String },

    #[error("Archiver '{program}' failed creating {destination:?}: {message}")]
    CommandFailed {
        program: String,
        destination: PathBuf,
        message: String,
    },

    #[error("Invalid command template: {0}")]
    Template(String),
}

/// Abstraction over materializing one artifact
pub trait ArchiveOperations: Send + Sync {
    /// Configured backup method
    fn method(&self) -> BackupMethod;

    /// Fail unless the archiver executable can be resolved
    fn ensure_available(&self) -> Result<(), ArchiveError>;

    /// Create one artifact at `destination` from `source`
    fn create_artifact(&self, source: &Path, destination: &Path) -> Result<(), ArchiveError>;
}

/// Implementation that shells out to the configured archiver
pub struct RealArchiveOps {
    strategy: Box<dyn BackupStrategy>,
    template: String,
    executor: Arc<dyn CommandExecutor>,
}

impl RealArchiveOps {
    pub fn new(config: &ResolvedConfig) -> Self {
        Self::with_executor(config.method, &config.command, Arc::new(RealExecutor::new()))
    }

    pub fn with_executor(
        method: BackupMethod,
        template: &str,
        executor: Arc<dyn CommandExecutor>,
    ) -> Self {
        Self {
            strategy: strategies::for_method(method),
            template: template.to_string(),
            executor,
        }
    }

    fn program(&self) -> Result<String, ArchiveError> {
        self.template
            .split_whitespace()
            .next()
            .map(str::to_string)
            .ok_or_else(|| ArchiveError::Template("command template is empty".to_string()))
    }
}

impl ArchiveOperations for RealArchiveOps {
    fn method(&self) -> BackupMethod {
        self.strategy.method()
    }

    fn ensure_available(&self) -> Result<(), ArchiveError> {
        let program = self.program()?;
        let resolved = self
            .executor
            .resolve(&program)
            .map_err(|e| ArchiveError::ToolNotFound {
                program: program.clone(),
                message: e.to_string(),
            })?;
        debug!("Resolved {} archiver: {:?}", self.strategy.name(), resolved);
        Ok(())
    }

    fn create_artifact(&self, source: &Path, destination: &Path) -> Result<(), ArchiveError> {
        self.ensure_available()?;

        let spec = self
            .strategy
            .build_command(&self.template, source, destination)
            .map_err(|e| ArchiveError::Template(e.to_string()))?;

        info!(
            "Running {} for {:?} -> {:?}",
            self.strategy.name(),
            source,
            destination
        );

        self.executor
            .run_command(&spec.program, &spec.args_as_str(), None)
            .map_err(|e| ArchiveError::CommandFailed {
                program: spec.program.clone(),
                destination: destination.to_path_buf(),
                message: e.to_string(),
            })?;

        Ok(())
    }
}

/// Mock archiver for tests
/// Available for use in external test crates
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Recorded archiver invocation
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct ArchiveCall {
        pub source: PathBuf,
        pub destination: PathBuf,
    }

    /// Mock that materializes placeholder artifacts on disk
    #[derive(Clone)]
    pub struct MockArchiveOps {
        pub calls: Arc<Mutex<Vec<ArchiveCall>>>,
        method: BackupMethod,
        available: bool,
        should_fail: bool,
    }

    impl Default for MockArchiveOps {
        fn default() -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
                method: BackupMethod::Tar,
                available: true,
                should_fail: false,
            }
        }
    }

    impl MockArchiveOps {
        pub fn new() -> Self {
            Self::default()
        }

        /// Produce directory artifacts like a mirror would
        pub fn mirroring(mut self) -> Self {
            self.method = BackupMethod::Rsync;
            self
        }

        /// Pretend the archiver is not installed
        pub fn unavailable(mut self) -> Self {
            self.available = false;
            self
        }

        /// Fail every invocation with a non-zero exit
        pub fn failing(mut self) -> Self {
            self.should_fail = true;
            self
        }

        pub fn get_calls(&self) -> Vec<ArchiveCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn was_called_for(&self, destination: &Path) -> bool {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .any(|c| c.destination == destination)
        }
    }

    impl ArchiveOperations for MockArchiveOps {
        fn method(&self) -> BackupMethod {
            self.method
        }

        fn ensure_available(&self) -> Result<(), ArchiveError> {
            if self.available {
                Ok(())
            } else {
                Err(ArchiveError::ToolNotFound {
                    program: self.method.to_string(),
                    message: "not installed".to_string(),
                })
            }
        }

        fn create_artifact(&self, source: &Path, destination: &Path) -> Result<(), ArchiveError> {
            self.ensure_available()?;

            self.calls.lock().unwrap().push(ArchiveCall {
                source: source.to_path_buf(),
                destination: destination.to_path_buf(),
            });

            let failed = |message: String| ArchiveError::CommandFailed {
                program: self.method.to_string(),
                destination: destination.to_path_buf(),
                message,
            };

            if self.should_fail {
                return Err(failed("exit code 2".to_string()));
            }

            let contents = format!("backup of {}", source.display());
            let written = if self.method == BackupMethod::Rsync {
                std::fs::create_dir_all(destination)
                    .and_then(|_| std::fs::write(destination.join("contents.txt"), contents))
            } else {
                std::fs::write(destination, contents)
            };
            written.map_err(|e| failed(e.to_string()))
        }
    }
}
