//! Rotation - prunes artifacts beyond each tier's retention count

use crate::config::{ResolvedConfig, RetentionPolicy};
use crate::policy::{ArtifactNamer, Tier};
use crate::utils::fs_ops;
use crate::utils::manifest::Manifest;
use crate::utils::reporter::{Reporter, RunEvent};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// One backup on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub name: String,
    pub tier: Tier,
    pub created: DateTime<Local>,
}

/// Outcome of a rotation pass
#[derive(Debug, Clone, Default)]
pub struct RotationReport {
    /// Artifacts found for the project
    pub scanned: usize,
    /// Artifacts beyond their tier's retention count
    pub expired: Vec<Artifact>,
    /// Artifacts actually removed
    pub deleted: Vec<PathBuf>,
    /// Artifacts that could not be removed, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

impl RotationReport {
    pub fn kept(&self) -> usize {
        self.scanned - self.expired.len()
    }
}

/// Select the artifacts that exceed their tier's retention.
///
/// For every tier, artifacts are ordered newest-first by creation time and
/// everything after the first `retention.count(tier)` is returned. A count
/// of zero expires the whole tier. Ties on creation time are broken by path
/// so the result does not depend on directory listing order.
pub fn plan_rotation(artifacts: &[Artifact], retention: &RetentionPolicy) -> Vec<Artifact> {
    let mut expired = Vec::new();

    for tier in Tier::ALL {
        let mut tier_artifacts: Vec<&Artifact> =
            artifacts.iter().filter(|a| a.tier == tier).collect();

        tier_artifacts.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| b.path.cmp(&a.path)));

        expired.extend(
            tier_artifacts
                .into_iter()
                .skip(retention.count(tier) as usize)
                .cloned(),
        );
    }

    expired
}

pub struct Rotator {
    namer: ArtifactNamer,
    retention: RetentionPolicy,
    reporter: Arc<dyn Reporter>,
}

impl Rotator {
    pub fn new(config: &ResolvedConfig, reporter: Arc<dyn Reporter>) -> Self {
        Self::with_namer(
            ArtifactNamer::new(&config.destination, &config.project, &config.extension),
            config.retention,
            reporter,
        )
    }

    pub fn with_namer(
        namer: ArtifactNamer,
        retention: RetentionPolicy,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            namer,
            retention,
            reporter,
        }
    }

    fn manifest_path(&self) -> PathBuf {
        Manifest::path_for(self.namer.destination(), self.namer.project())
    }

    /// Load the manifest; an unreadable one is reported and treated as empty
    fn load_manifest(&self) -> Manifest {
        let path = self.manifest_path();
        Manifest::load(&path, self.namer.project()).unwrap_or_else(|e| {
            self.reporter.report(RunEvent::ManifestProblem {
                path,
                error: format!("{:#}", e),
            });
            Manifest::new(self.namer.project())
        })
    }

    /// List every artifact of this project in the destination directory
    pub fn scan(&self) -> Result<Vec<Artifact>> {
        let manifest = self.load_manifest();
        self.scan_with(&manifest)
    }

    fn scan_with(&self, manifest: &Manifest) -> Result<Vec<Artifact>> {
        let destination = self.namer.destination();
        if !destination.exists() {
            debug!("Destination {:?} does not exist yet", destination);
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(destination)
            .with_context(|| format!("Failed to list destination {:?}", destination))?;

        let mut artifacts = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry in {:?}: {}", destination, e);
                    continue;
                }
            };
            let name = entry.file_name().to_string_lossy().to_string();

            if Manifest::is_manifest_file(&name, self.namer.project()) {
                continue;
            }

            let tier = if name.contains(self.namer.project()) {
                manifest
                    .tier_of(&name)
                    .or_else(|| self.namer.classify(&name))
            } else {
                None
            };
            let Some(tier) = tier else {
                continue;
            };

            let path = entry.path();
            match fs_ops::creation_time(&path) {
                Ok(created) => artifacts.push(Artifact {
                    path,
                    name,
                    tier,
                    created,
                }),
                Err(e) => debug!("Skipping {:?}: {}", path, e),
            }
        }

        Ok(artifacts)
    }

    /// Artifacts that a rotation would delete right now
    pub fn plan(&self) -> Result<Vec<Artifact>> {
        Ok(plan_rotation(&self.scan()?, &self.retention))
    }

    /// Delete every artifact beyond its tier's retention count.
    ///
    /// Each deletion is attempted independently; failures are reported and
    /// collected without stopping the pass. With `dry_run` nothing is
    /// removed.
    pub fn rotate(&self, dry_run: bool) -> Result<RotationReport> {
        let manifest = self.load_manifest();
        let artifacts = self.scan_with(&manifest)?;
        Ok(self.rotate_artifacts(manifest, &artifacts, dry_run))
    }

    /// Rotate an already scanned artifact list.
    ///
    /// Artifacts that vanished since the scan count as failed deletions.
    pub fn rotate_scanned(&self, artifacts: &[Artifact], dry_run: bool) -> RotationReport {
        self.rotate_artifacts(self.load_manifest(), artifacts, dry_run)
    }

    fn rotate_artifacts(
        &self,
        mut manifest: Manifest,
        artifacts: &[Artifact],
        dry_run: bool,
    ) -> RotationReport {
        let expired = plan_rotation(artifacts, &self.retention);

        let mut report = RotationReport {
            scanned: artifacts.len(),
            expired: expired.clone(),
            ..Default::default()
        };

        if expired.is_empty() {
            self.reporter.report(RunEvent::NothingToRotate);
            return report;
        }

        let mut manifest_changed = false;

        for artifact in expired {
            self.reporter.report(RunEvent::Deleting {
                tier: artifact.tier,
                path: artifact.path.clone(),
            });

            if dry_run {
                continue;
            }

            match fs_ops::remove_artifact(&artifact.path) {
                Ok(()) => {
                    self.reporter.report(RunEvent::Deleted {
                        tier: artifact.tier,
                        path: artifact.path.clone(),
                    });
                    manifest_changed |= manifest.forget(&artifact.name);
                    report.deleted.push(artifact.path);
                }
                Err(e) => {
                    self.reporter.report(RunEvent::DeletionFailed {
                        path: artifact.path.clone(),
                        error: e.to_string(),
                    });
                    report.failed.push((artifact.path, e.to_string()));
                }
            }
        }

        if dry_run {
            return report;
        }

        manifest_changed |= manifest.retain_existing(self.namer.destination()) > 0;
        if manifest_changed {
            let path = self.manifest_path();
            if let Err(e) = manifest.save(&path) {
                self.reporter.report(RunEvent::ManifestProblem {
                    path,
                    error: format!("{:#}", e),
                });
            }
        }

        report
    }
}
