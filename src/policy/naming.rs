//! Artifact naming
//!
//! Artifacts live at `{destination}/{project}-{tier}-{timestamp}{extension}`.

use super::Tier;
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

/// Day granularity, used for every base tier
pub const DAY_FORMAT: &str = "%Y:%m:%d";

/// Second granularity, used for hourly artifacts
pub const TIMESTAMP_FORMAT: &str = "%Y:%m:%d-%H:%M:%S";

/// Builds and recognizes artifact names for one project
#[derive(Debug, Clone)]
pub struct ArtifactNamer {
    destination: PathBuf,
    project: String,
    extension: String,
}

impl ArtifactNamer {
    pub fn new(destination: impl Into<PathBuf>, project: &str, extension: &str) -> Self {
        Self {
            destination: destination.into(),
            project: project.to_string(),
            extension: extension.to_string(),
        }
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// File name of an artifact created at `now`
    pub fn artifact_name(&self, tier: Tier, now: NaiveDateTime, include_time: bool) -> String {
        let format = if include_time { TIMESTAMP_FORMAT } else { DAY_FORMAT };
        format!(
            "{}-{}-{}{}",
            self.project,
            tier,
            now.format(format),
            self.extension
        )
    }

    /// Full path of an artifact created at `now`
    pub fn artifact_path(&self, tier: Tier, now: NaiveDateTime, include_time: bool) -> PathBuf {
        self.destination
            .join(self.artifact_name(tier, now, include_time))
    }

    /// Path of the base-tier artifact for the day of `now`
    pub fn base_path(&self, tier: Tier, now: NaiveDateTime) -> PathBuf {
        self.artifact_path(tier, now, false)
    }

    /// Path of the hourly artifact for `now`
    pub fn hourly_path(&self, now: NaiveDateTime) -> PathBuf {
        self.artifact_path(Tier::Hourly, now, true)
    }

    /// Tier of a directory entry named `name`, or `None` if the entry does
    /// not belong to this project.
    ///
    /// The `{project}-{tier}-` prefix is authoritative. Other names fall back
    /// to searching for a tier tag outside the project name, first match in
    /// rotation order.
    pub fn classify(&self, name: &str) -> Option<Tier> {
        if self.project.is_empty() || !name.contains(&self.project) {
            return None;
        }

        if let Some(rest) = name.strip_prefix(&self.project) {
            for tier in Tier::ALL {
                let tagged = rest
                    .strip_prefix('-')
                    .and_then(|r| r.strip_prefix(tier.as_str()));
                if let Some(after) = tagged {
                    if after.starts_with('-') {
                        return Some(tier);
                    }
                }
            }
        }

        let remainder = name.replacen(&self.project, "", 1);
        Tier::ALL
            .iter()
            .copied()
            .find(|tier| remainder.contains(tier.as_str()))
    }
}
