use crate::policy::Tier;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub backup: BackupSection,
    #[serde(default)]
    pub retention: RetentionPolicy,
    #[serde(default)]
    pub methods: MethodsConfig,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// What to back up and where to put it
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackupSection {
    /// Name embedded in every artifact name
    pub project: String,

    /// Directory to back up
    pub source: PathBuf,

    /// Directory holding the artifacts
    pub destination: PathBuf,

    /// Suffix appended to generated artifact names (e.g. ".tar.gz")
    #[serde(default)]
    pub extension: String,

    /// Age under which a base-tier artifact is duplicated instead of re-archived
    #[serde(default = "default_reuse_window")]
    pub reuse_window_seconds: u64,
}

/// Per-tier retention counts. Zero disables creation for the tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RetentionPolicy {
    #[serde(default)]
    pub hourly: u32,
    #[serde(default)]
    pub daily: u32,
    #[serde(default)]
    pub weekly: u32,
    #[serde(default)]
    pub monthly: u32,
    #[serde(default)]
    pub yearly: u32,
}

impl RetentionPolicy {
    /// Number of artifacts to keep for a tier
    pub fn count(&self, tier: Tier) -> u32 {
        match tier {
            Tier::Hourly => self.hourly,
            Tier::Daily => self.daily,
            Tier::Weekly => self.weekly,
            Tier::Monthly => self.monthly,
            Tier::Yearly => self.yearly,
        }
    }

    /// Whether new artifacts of this tier are created at all
    pub fn is_enabled(&self, tier: Tier) -> bool {
        self.count(tier) > 0
    }
}

/// Available backup methods. Exactly one must be enabled.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct MethodsConfig {
    #[serde(default)]
    pub tar: MethodConfig,
    #[serde(default)]
    pub rsync: MethodConfig,
}

impl MethodsConfig {
    /// All methods with their settings, in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (BackupMethod, &MethodConfig)> {
        [(BackupMethod::Tar, &self.tar), (BackupMethod::Rsync, &self.rsync)].into_iter()
    }

    /// Methods switched on in the configuration
    pub fn enabled(&self) -> Vec<BackupMethod> {
        self.iter()
            .filter(|(_, m)| m.enabled)
            .map(|(method, _)| method)
            .collect()
    }

    pub fn get(&self, method: BackupMethod) -> &MethodConfig {
        match method {
            BackupMethod::Tar => &self.tar,
            BackupMethod::Rsync => &self.rsync,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct MethodConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Command template with `{source}` and `{destination}` placeholders
    #[serde(default)]
    pub command: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupMethod {
    /// Compressed archive file
    Tar,
    /// Mirrored directory tree
    Rsync,
}

impl fmt::Display for BackupMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackupMethod::Tar => write!(f, "tar"),
            BackupMethod::Rsync => write!(f, "rsync"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSection {
    /// Directory for rolling log files. Console only when unset.
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_max_files")]
    pub max_files: u32,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            directory: None,
            level: default_log_level(),
            max_files: default_log_max_files(),
        }
    }
}

/// Configuration after validation, method selection and path expansion
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub project: String,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub extension: String,
    pub retention: RetentionPolicy,
    pub method: BackupMethod,
    pub command: String,
    pub reuse_window_seconds: u64,
}

/// Legacy flat JSON layout (`config.json`)
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyJsonConfig {
    #[serde(rename = "SRC_DIR")]
    pub src_dir: PathBuf,
    #[serde(rename = "BACKUP_DIR")]
    pub backup_dir: PathBuf,
    #[serde(rename = "PROJECT_NAME")]
    pub project_name: String,
    #[serde(rename = "BACKUP_RETENTION_HOURLY", default)]
    pub retention_hourly: u32,
    #[serde(rename = "BACKUP_RETENTION_DAILY", default)]
    pub retention_daily: u32,
    #[serde(rename = "BACKUP_RETENTION_WEEKLY", default)]
    pub retention_weekly: u32,
    #[serde(rename = "BACKUP_RETENTION_MONTHLY", default)]
    pub retention_monthly: u32,
    #[serde(rename = "BACKUP_RETENTION_YEARLY", default)]
    pub retention_yearly: u32,
}

impl From<LegacyJsonConfig> for Config {
    fn from(legacy: LegacyJsonConfig) -> Self {
        Config {
            backup: BackupSection {
                project: legacy.project_name,
                source: legacy.src_dir,
                destination: legacy.backup_dir,
                extension: ".tar.gz".to_string(),
                reuse_window_seconds: default_reuse_window(),
            },
            retention: RetentionPolicy {
                hourly: legacy.retention_hourly,
                daily: legacy.retention_daily,
                weekly: legacy.retention_weekly,
                monthly: legacy.retention_monthly,
                yearly: legacy.retention_yearly,
            },
            methods: MethodsConfig {
                tar: MethodConfig {
                    enabled: true,
                    command: None,
                },
                rsync: MethodConfig::default(),
            },
            logging: LoggingSection::default(),
        }
    }
}

// Default value functions

pub(crate) fn default_reuse_window() -> u64 { 360 }
fn default_log_level() -> String { "info".to_string() }
fn default_log_max_files() -> u32 { 10 }
