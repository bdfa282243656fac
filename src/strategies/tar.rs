//! Archive-to-file strategy
//!
//! Produces one compressed tarball per artifact.

use super::BackupStrategy;
use crate::config::BackupMethod;

pub struct TarStrategy;

impl TarStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TarStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl BackupStrategy for TarStrategy {
    fn method(&self) -> BackupMethod {
        BackupMethod::Tar
    }

    fn default_template(&self) -> &'static str {
        "tar czf {destination} {source}"
    }

    fn produces_directory(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "tar"
    }
}
