use super::types::*;
use crate::strategies;
use std::fs;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to parse JSON config file: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("No backup method enabled (enable exactly one of: tar, rsync)")]
    NoBackupMethod,

    #[error("Multiple backup methods enabled: {0} (enable exactly one)")]
    MultipleBackupMethods(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Largest reuse window that still fits a `chrono::Duration`
pub const MAX_REUSE_WINDOW_SECONDS: u64 = (i64::MAX / 1000) as u64;

/// Load and validate configuration from a TOML file, or from the legacy
/// flat JSON layout when the file has a `.json` extension
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let config: Config = if is_json {
        let legacy: LegacyJsonConfig = serde_json::from_str(&contents)?;
        legacy.into()
    } else {
        toml::from_str(&contents)?
    };

    validate_config(&config)?;
    Ok(config)
}

/// Validate the configuration
fn validate_config(config: &Config) -> Result<()> {
    let backup = &config.backup;

    if backup.project.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Project name must not be empty".to_string(),
        ));
    }

    if backup.project.contains('/') || backup.project.contains('\\') {
        return Err(ConfigError::ValidationError(format!(
            "Project name must not contain a path separator: {}",
            backup.project
        )));
    }

    if backup.source.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "Source path must not be empty".to_string(),
        ));
    }

    if backup.destination.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "Destination directory must not be empty".to_string(),
        ));
    }

    let source = super::expand_tilde(&backup.source);
    if !source.exists() {
        return Err(ConfigError::ValidationError(format!(
            "Source path does not exist: {:?}",
            source
        )));
    }

    if backup.reuse_window_seconds > MAX_REUSE_WINDOW_SECONDS {
        return Err(ConfigError::ValidationError(format!(
            "reuse_window_seconds must be at most {}, got {}",
            MAX_REUSE_WINDOW_SECONDS, backup.reuse_window_seconds
        )));
    }

    let method = selected_method(config)?;
    let template = effective_command(config, method);
    if template.split_whitespace().next().is_none() {
        return Err(ConfigError::ValidationError(format!(
            "Command template for method '{}' is empty",
            method
        )));
    }

    Ok(())
}

/// The single enabled backup method
pub fn selected_method(config: &Config) -> Result<BackupMethod> {
    let enabled = config.methods.enabled();

    match enabled.as_slice() {
        [] => Err(ConfigError::NoBackupMethod),
        [method] => Ok(*method),
        many => Err(ConfigError::MultipleBackupMethods(
            many.iter()
                .map(|m| m.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        )),
    }
}

/// Command template for a method (configured > method default)
fn effective_command(config: &Config, method: BackupMethod) -> String {
    config
        .methods
        .get(method)
        .command
        .clone()
        .unwrap_or_else(|| strategies::for_method(method).default_template().to_string())
}

/// Resolve the configuration into the values a run works with
pub fn resolve_config(config: &Config) -> Result<ResolvedConfig> {
    let method = selected_method(config)?;

    Ok(ResolvedConfig {
        project: config.backup.project.clone(),
        source: super::expand_tilde(&config.backup.source),
        destination: super::expand_tilde(&config.backup.destination),
        extension: config.backup.extension.clone(),
        retention: config.retention,
        method,
        command: effective_command(config, method),
        reuse_window_seconds: config.backup.reuse_window_seconds,
    })
}
