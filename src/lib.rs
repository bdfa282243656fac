//! Tier Backup Library
//!
//! Creates tiered (hourly/daily/weekly/monthly/yearly) backups of a source
//! directory with an external archiver and prunes them per tier.

pub mod config;
pub mod managers;
pub mod policy;
pub mod strategies;
pub mod utils;

// Re-export commonly used types
pub use config::{load_config, resolve_config, Config, ResolvedConfig, RetentionPolicy};
pub use managers::backup::{ArtifactOutcome, BackupManager, CreationReport, RunReport};
pub use managers::logging::{init_console_logging, init_logging, LogGuard, LoggingConfig};
pub use managers::rotation::{plan_rotation, Artifact, RotationReport, Rotator};
pub use policy::{select_base_tier, ArtifactNamer, Tier};
