//! Test utilities for tier-backup
//!
//! This crate provides shared test utilities, mock re-exports,
//! and helper functions for testing the tier-backup application.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use test_utils::{ConfigBuilder, MockArchiveOps, RecordingReporter, TestContext};
//!
//! #[test]
//! fn my_test() {
//!     let ctx = TestContext::from_builder(ConfigBuilder::minimal().daily(3));
//!     let manager = ctx.manager(&MockArchiveOps::new(), &RecordingReporter::new());
//!     // ... test code
//! }
//! ```

pub mod config_builder;
pub mod fixtures;
pub mod test_context;

// Re-export commonly used items
pub use config_builder::ConfigBuilder;
pub use fixtures::*;
pub use test_context::{ResultAssertions, TestContext};

// Re-export types from the main crate for convenience
pub use tier_backup::config::{
    BackupMethod, BackupSection, Config, LoggingSection, MethodConfig, MethodsConfig,
    ResolvedConfig, RetentionPolicy,
};
pub use tier_backup::managers::backup::{ArtifactOutcome, BackupManager};
pub use tier_backup::managers::rotation::{plan_rotation, Artifact, Rotator};
pub use tier_backup::policy::{ArtifactNamer, Tier};
pub use tier_backup::utils::reporter::{Reporter, RunEvent};

// Re-export mock implementations from the main crate
pub use tier_backup::utils::archive_ops::mock::MockArchiveOps;
pub use tier_backup::utils::archive_ops::ArchiveOperations;
pub use tier_backup::utils::executor::mock::MockExecutor;
pub use tier_backup::utils::executor::CommandExecutor;
pub use tier_backup::utils::reporter::mock::RecordingReporter;

/// Common test result type
pub type TestResult<T = ()> = anyhow::Result<T>;
