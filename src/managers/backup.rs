//! Backup manager - orchestrates artifact creation followed by rotation

use crate::config::ResolvedConfig;
use crate::managers::rotation::{RotationReport, Rotator};
use crate::policy::{select_base_tier, ArtifactNamer, Tier};
use crate::utils::archive_ops::{ArchiveOperations, RealArchiveOps};
use crate::utils::fs_ops;
use crate::utils::manifest::Manifest;
use crate::utils::reporter::{Reporter, RunEvent, TracingReporter};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Local};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What happened to one target artifact during creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactOutcome {
    /// Archiver produced the artifact
    Created(PathBuf),
    /// Hourly artifact copied from a fresh base-tier artifact
    Duplicated { from: PathBuf, to: PathBuf },
    /// Target already on disk; nothing done
    AlreadyExists(PathBuf),
    /// Tier has retention 0
    Disabled,
}

impl ArtifactOutcome {
    /// Whether this run put a new artifact on disk
    pub fn produced(&self) -> bool {
        matches!(self, ArtifactOutcome::Created(_) | ArtifactOutcome::Duplicated { .. })
    }
}

/// Reuse window as a duration, `None` when it does not fit one
fn reuse_window(seconds: u64) -> Option<Duration> {
    i64::try_from(seconds).ok().and_then(Duration::try_seconds)
}

/// Result of the creation phase
#[derive(Debug, Clone)]
pub struct CreationReport {
    pub base_tier: Tier,
    pub base: ArtifactOutcome,
    pub hourly: ArtifactOutcome,
}

impl CreationReport {
    pub fn nothing_created(&self) -> bool {
        !self.base.produced() && !self.hourly.produced()
    }
}

/// Result of a full run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub creation: CreationReport,
    pub rotation: RotationReport,
}

pub struct BackupManager {
    config: ResolvedConfig,
    namer: ArtifactNamer,
    archiver: Arc<dyn ArchiveOperations>,
    reporter: Arc<dyn Reporter>,
}

impl BackupManager {
    /// Create a backup manager that shells out to the configured archiver
    pub fn new(config: ResolvedConfig) -> Self {
        let archiver = Arc::new(RealArchiveOps::new(&config));
        Self::with_components(config, archiver, Arc::new(TracingReporter::new()))
    }

    /// Create a backup manager with explicit archiver and reporter
    pub fn with_components(
        config: ResolvedConfig,
        archiver: Arc<dyn ArchiveOperations>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        let namer = ArtifactNamer::new(&config.destination, &config.project, &config.extension);
        Self {
            config,
            namer,
            archiver,
            reporter,
        }
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn namer(&self) -> &ArtifactNamer {
        &self.namer
    }

    /// Rotator sharing this manager's configuration and reporter
    pub fn rotator(&self) -> Rotator {
        Rotator::with_namer(self.namer.clone(), self.config.retention, self.reporter.clone())
    }

    /// Fail unless the archiver can be resolved
    pub fn check_archiver(&self) -> Result<()> {
        self.archiver
            .ensure_available()
            .with_context(|| format!("Cannot run {} backups", self.archiver.method()))
    }

    /// Create the artifacts due at `now`.
    ///
    /// The base tier is created at most once per day (existence check). When
    /// hourly retention is enabled an hourly artifact is added, copied from
    /// the base-tier artifact if that one is younger than the reuse window.
    /// Any archiver failure aborts the run.
    pub fn create_backups(&self, now: DateTime<Local>) -> Result<CreationReport> {
        self.check_archiver()?;

        fs::create_dir_all(&self.config.destination).with_context(|| {
            format!(
                "Failed to create destination directory {:?}",
                self.config.destination
            )
        })?;

        let local = now.naive_local();
        let retention = &self.config.retention;

        let base_tier = select_base_tier(local.date(), retention);
        let base_enabled = retention.is_enabled(base_tier);
        self.reporter.report(RunEvent::TierSelected {
            tier: base_tier,
            enabled: base_enabled,
        });

        let base_path = self.namer.base_path(base_tier, local);
        let base = if !base_enabled {
            ArtifactOutcome::Disabled
        } else if base_path.exists() {
            self.reporter.report(RunEvent::AlreadyExists {
                tier: base_tier,
                path: base_path.clone(),
            });
            ArtifactOutcome::AlreadyExists(base_path.clone())
        } else {
            self.create_artifact(base_tier, &base_path)?;
            ArtifactOutcome::Created(base_path.clone())
        };

        let hourly = if retention.is_enabled(Tier::Hourly) {
            self.create_hourly(now, &base_path)?
        } else {
            ArtifactOutcome::Disabled
        };

        let report = CreationReport {
            base_tier,
            base,
            hourly,
        };

        if report.nothing_created() {
            self.reporter.report(RunEvent::NothingToCreate);
        }

        Ok(report)
    }

    fn create_hourly(&self, now: DateTime<Local>, base_path: &Path) -> Result<ArtifactOutcome> {
        let hourly_path = self.namer.hourly_path(now.naive_local());

        if hourly_path.exists() {
            self.reporter.report(RunEvent::AlreadyExists {
                tier: Tier::Hourly,
                path: hourly_path.clone(),
            });
            return Ok(ArtifactOutcome::AlreadyExists(hourly_path));
        }

        if self.is_fresh(base_path, now) {
            match fs_ops::duplicate_artifact(base_path, &hourly_path) {
                Ok(()) => {
                    self.reporter.report(RunEvent::Duplicated {
                        from: base_path.to_path_buf(),
                        to: hourly_path.clone(),
                    });
                    self.record_in_manifest(&hourly_path, Tier::Hourly);
                    return Ok(ArtifactOutcome::Duplicated {
                        from: base_path.to_path_buf(),
                        to: hourly_path,
                    });
                }
                Err(e) => {
                    warn!("Could not copy {:?}, archiving instead: {:#}", base_path, e);
                    if hourly_path.exists() {
                        if let Err(e) = fs_ops::remove_artifact(&hourly_path) {
                            warn!("Failed to remove partial copy {:?}: {}", hourly_path, e);
                        }
                    }
                }
            }
        }

        self.create_artifact(Tier::Hourly, &hourly_path)?;
        Ok(ArtifactOutcome::Created(hourly_path))
    }

    /// Whether the artifact at `path` exists and is younger than the reuse
    /// window. A creation time after `now` counts as fresh.
    fn is_fresh(&self, path: &Path, now: DateTime<Local>) -> bool {
        if !path.exists() {
            return false;
        }

        match fs_ops::creation_time(path) {
            Ok(created) => {
                let age = now.signed_duration_since(created);
                debug!("Artifact {:?} is {}s old", path, age.num_seconds());
                match reuse_window(self.config.reuse_window_seconds) {
                    Some(window) => age < window,
                    None => false,
                }
            }
            Err(e) => {
                debug!("Cannot read creation time of {:?}: {}", path, e);
                false
            }
        }
    }

    fn create_artifact(&self, tier: Tier, path: &Path) -> Result<()> {
        self.reporter.report(RunEvent::Creating {
            tier,
            path: path.to_path_buf(),
        });

        self.archiver
            .create_artifact(&self.config.source, path)
            .with_context(|| format!("Failed to create {} backup {:?}", tier, path))?;

        self.reporter.report(RunEvent::Created {
            tier,
            path: path.to_path_buf(),
        });
        self.record_in_manifest(path, tier);
        Ok(())
    }

    fn record_in_manifest(&self, path: &Path, tier: Tier) {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().to_string()) else {
            return;
        };

        let manifest_path = Manifest::path_for(self.namer.destination(), self.namer.project());
        let mut manifest = match Manifest::load(&manifest_path, self.namer.project()) {
            Ok(manifest) => manifest,
            Err(e) => {
                self.reporter.report(RunEvent::ManifestProblem {
                    path: manifest_path.clone(),
                    error: format!("{:#}", e),
                });
                Manifest::new(self.namer.project())
            }
        };

        manifest.record(&name, tier);
        if let Err(e) = manifest.save(&manifest_path) {
            self.reporter.report(RunEvent::ManifestProblem {
                path: manifest_path,
                error: format!("{:#}", e),
            });
        }
    }

    /// Rotate artifacts according to the retention policy
    pub fn rotate(&self, dry_run: bool) -> Result<RotationReport> {
        self.rotator().rotate(dry_run)
    }

    /// Create due artifacts, then rotate. Rotation does not run if creation
    /// fails.
    pub fn run(&self, now: DateTime<Local>) -> Result<RunReport> {
        info!(
            "Starting backup run for '{}' ({} -> {:?})",
            self.config.project, self.config.method, self.config.destination
        );

        let creation = self.create_backups(now)?;
        let rotation = self.rotate(false)?;

        info!(
            "Backup run for '{}' finished: {} kept, {} deleted, {} failed deletions",
            self.config.project,
            rotation.kept(),
            rotation.deleted.len(),
            rotation.failed.len()
        );

        Ok(RunReport { creation, rotation })
    }
}
