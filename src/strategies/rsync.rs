//! Mirror-to-directory strategy
//!
//! Each artifact is a full copy of the source tree.

use super::BackupStrategy;
use crate::config::BackupMethod;

pub struct RsyncStrategy;

impl RsyncStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RsyncStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl BackupStrategy for RsyncStrategy {
    fn method(&self) -> BackupMethod {
        BackupMethod::Rsync
    }

    fn default_template(&self) -> &'static str {
        // Trailing slash copies the contents of source into destination
        "rsync -a --delete {source}/ {destination}"
    }

    fn produces_directory(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "rsync"
    }
}
