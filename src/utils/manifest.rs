//! Per-project artifact manifest
//!
//! Records the tier of every artifact at creation time so rotation does not
//! depend on tier words appearing in file names. Stored as JSON next to the
//! artifacts at `{destination}/.{project}.manifest.json`. Entries missing from
//! the manifest (artifacts made before it existed, or by other tools) are
//! still classified by name.

use crate::policy::Tier;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ManifestEntry {
    pub tier: Tier,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Manifest {
    pub version: u32,
    pub project: String,
    /// Artifact file name -> entry
    #[serde(default)]
    pub entries: BTreeMap<String, ManifestEntry>,
}

impl Manifest {
    pub fn new(project: &str) -> Self {
        Self {
            version: MANIFEST_VERSION,
            project: project.to_string(),
            entries: BTreeMap::new(),
        }
    }

    pub fn file_name(project: &str) -> String {
        format!(".{}.manifest.json", project)
    }

    pub fn path_for(destination: &Path, project: &str) -> PathBuf {
        destination.join(Self::file_name(project))
    }

    /// Whether a directory entry is this project's manifest (or its temp file)
    pub fn is_manifest_file(name: &str, project: &str) -> bool {
        let manifest = Self::file_name(project);
        name == manifest || name.strip_suffix(".tmp") == Some(manifest.as_str())
    }

    /// Load the manifest, returning an empty one if the file does not exist
    pub fn load(path: &Path, project: &str) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new(project));
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {:?}", path))?;
        let manifest: Manifest = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse manifest {:?}", path))?;

        if manifest.version > MANIFEST_VERSION {
            anyhow::bail!(
                "Manifest {:?} has unsupported version {}",
                path,
                manifest.version
            );
        }

        Ok(manifest)
    }

    /// Write the manifest through a temp file and rename
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self).context("Failed to serialize manifest")?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, contents).with_context(|| format!("Failed to write {:?}", tmp))?;
        fs::rename(&tmp, path).with_context(|| format!("Failed to replace manifest {:?}", path))?;
        Ok(())
    }

    pub fn record(&mut self, name: &str, tier: Tier) {
        self.entries.insert(
            name.to_string(),
            ManifestEntry {
                tier,
                recorded_at: Utc::now(),
            },
        );
    }

    pub fn forget(&mut self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    pub fn tier_of(&self, name: &str) -> Option<Tier> {
        self.entries.get(name).map(|e| e.tier)
    }

    /// Drop entries whose artifact no longer exists, returning how many went
    pub fn retain_existing(&mut self, destination: &Path) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|name, _| fs::symlink_metadata(destination.join(name)).is_ok());
        before - self.entries.len()
    }
}
