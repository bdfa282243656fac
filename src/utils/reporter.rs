//! Diagnostic sink for backup runs
//!
//! The backup manager and the rotator report what they do through a
//! [`Reporter`] handed to them at construction. The default implementation
//! forwards events to `tracing`; tests use [`mock::RecordingReporter`] to
//! assert on the exact sequence of events.

use crate::policy::Tier;
use std::path::PathBuf;
use tracing::{info, warn};

/// Something that happened during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// Base tier due for this run
    TierSelected { tier: Tier, enabled: bool },
    /// Archiver invocation about to start
    Creating { tier: Tier, path: PathBuf },
    /// Artifact created by the archiver
    Created { tier: Tier, path: PathBuf },
    /// Hourly artifact copied from a fresh base-tier artifact
    Duplicated { from: PathBuf, to: PathBuf },
    /// Target path already present, nothing created
    AlreadyExists { tier: Tier, path: PathBuf },
    /// Neither base tier nor hourly produced an artifact
    NothingToCreate,
    /// Artifact selected for deletion
    Deleting { tier: Tier, path: PathBuf },
    /// Artifact removed from disk
    Deleted { tier: Tier, path: PathBuf },
    /// Removal failed; rotation continues with the next candidate
    DeletionFailed { path: PathBuf, error: String },
    /// No artifact exceeded its tier's retention count
    NothingToRotate,
    /// Manifest could not be read or written; directory scan still applies
    ManifestProblem { path: PathBuf, error: String },
}

/// Receiver of run events
pub trait Reporter: Send + Sync {
    fn report(&self, event: RunEvent);
}

/// Reporter that logs every event through `tracing`
#[derive(Debug, Clone, Default)]
pub struct TracingReporter;

impl TracingReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for TracingReporter {
    fn report(&self, event: RunEvent) {
        match event {
            RunEvent::TierSelected { tier, enabled } => {
                if enabled {
                    info!("Base tier for today: {}", tier);
                } else {
                    info!("Base tier for today: {} (retention 0, not created)", tier);
                }
            }
            RunEvent::Creating { tier, path } => info!("Creating {} backup: {:?}", tier, path),
            RunEvent::Created { tier, path } => info!("Created {} backup: {:?}", tier, path),
            RunEvent::Duplicated { from, to } => {
                info!("Copied fresh backup {:?} to {:?}", from, to)
            }
            RunEvent::AlreadyExists { tier, path } => {
                info!("{} backup already exists: {:?}", tier, path)
            }
            RunEvent::NothingToCreate => info!("Nothing to create"),
            RunEvent::Deleting { tier, path } => info!("Deleting old {} backup: {:?}", tier, path),
            RunEvent::Deleted { tier, path } => info!("Deleted {} backup: {:?}", tier, path),
            RunEvent::DeletionFailed { path, error } => {
                warn!("Failed to delete {:?}: {}", path, error)
            }
            RunEvent::NothingToRotate => info!("Nothing to rotate"),
            RunEvent::ManifestProblem { path, error } => {
                warn!("Manifest {:?} unusable: {}", path, error)
            }
        }
    }
}

/// Recording reporter for tests
/// Available for use in external test crates
pub mod mock {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    pub struct RecordingReporter {
        pub events: Arc<Mutex<Vec<RunEvent>>>,
    }

    impl RecordingReporter {
        pub fn new() -> Self {
            Self::default()
        }

        /// All events reported so far
        pub fn events(&self) -> Vec<RunEvent> {
            self.events.lock().unwrap().clone()
        }

        /// Whether an event equal to `event` was reported
        pub fn contains(&self, event: &RunEvent) -> bool {
            self.events.lock().unwrap().iter().any(|e| e == event)
        }

        /// Number of events matching a predicate
        pub fn count<F: Fn(&RunEvent) -> bool>(&self, predicate: F) -> usize {
            self.events.lock().unwrap().iter().filter(|e| predicate(e)).count()
        }
    }

    impl Reporter for RecordingReporter {
        fn report(&self, event: RunEvent) {
            self.events.lock().unwrap().push(event);
        }
    }
}
