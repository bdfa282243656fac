//! Configuration loading and resolution

use std::fs;
use test_utils::{legacy_config_json, minimal_config_toml, BackupMethod, ConfigBuilder, TestResult};
use tier_backup::config::{load_config, resolve_config, ConfigError, MAX_REUSE_WINDOW_SECONDS};

#[test]
fn test_builder_config_loads_and_resolves() -> TestResult {
    let (path, config, _temp_dir) = ConfigBuilder::minimal().daily(7).hourly(24).write_toml();

    let loaded = load_config(&path)?;
    let resolved = resolve_config(&loaded)?;

    assert_eq!(resolved.project, config.backup.project);
    assert_eq!(resolved.method, BackupMethod::Tar);
    assert_eq!(resolved.command, "tar czf {destination} {source}");
    assert_eq!(resolved.retention.hourly, 24);
    assert_eq!(resolved.reuse_window_seconds, 360);
    Ok(())
}

#[test]
fn test_minimal_toml_fixture() -> TestResult {
    let builder = ConfigBuilder::new();
    let path = builder.temp_dir().join("config.toml");
    let source = builder.temp_dir().join("source");
    fs::write(&path, minimal_config_toml(&source, &builder.destination()))?;

    let config = load_config(&path)?;
    assert_eq!(config.backup.project, "testapp");
    assert_eq!(config.retention.hourly, 0);
    assert_eq!(config.retention.yearly, 1);
    Ok(())
}

#[test]
fn test_legacy_json_maps_to_tar() -> TestResult {
    let builder = ConfigBuilder::new();
    let path = builder.temp_dir().join("config.json");
    let source = builder.temp_dir().join("source");
    fs::write(&path, legacy_config_json(&source, &builder.destination()))?;

    let resolved = resolve_config(&load_config(&path)?)?;
    assert_eq!(resolved.method, BackupMethod::Tar);
    assert_eq!(resolved.extension, ".tar.gz");
    assert_eq!(resolved.retention.hourly, 24);
    assert_eq!(resolved.retention.monthly, 6);
    Ok(())
}

#[test]
fn test_rsync_resolves_default_template() -> TestResult {
    let (path, _config, _temp_dir) = ConfigBuilder::new()
        .with_method(BackupMethod::Rsync)
        .with_extension("")
        .write_toml();

    let resolved = resolve_config(&load_config(&path)?)?;
    assert_eq!(resolved.method, BackupMethod::Rsync);
    assert!(resolved.command.starts_with("rsync "));
    Ok(())
}

#[test]
fn test_no_method_is_rejected() {
    let (path, _config, _temp_dir) = ConfigBuilder::new().write_toml();

    let result = load_config(&path);
    assert!(matches!(result, Err(ConfigError::NoBackupMethod)));
}

#[test]
fn test_two_methods_are_rejected() {
    let (path, _config, _temp_dir) = ConfigBuilder::minimal()
        .with_method(BackupMethod::Rsync)
        .write_toml();

    match load_config(&path) {
        Err(ConfigError::MultipleBackupMethods(names)) => {
            assert!(names.contains("tar"));
            assert!(names.contains("rsync"));
        }
        other => panic!("Expected MultipleBackupMethods, got {:?}", other),
    }
}

#[test]
fn test_project_with_separator_is_rejected() {
    let (path, _config, _temp_dir) = ConfigBuilder::minimal()
        .with_project("team/site")
        .write_toml();

    assert!(matches!(
        load_config(&path),
        Err(ConfigError::ValidationError(_))
    ));
}

#[test]
fn test_oversized_reuse_window_is_rejected() {
    let (path, _config, _temp_dir) = ConfigBuilder::minimal()
        .hourly(2)
        .daily(2)
        .with_reuse_window(9_000_000_000_000_000_000)
        .write_toml();

    match load_config(&path) {
        Err(ConfigError::ValidationError(message)) => {
            assert!(message.contains("reuse_window_seconds"));
        }
        other => panic!("Expected ValidationError, got {:?}", other),
    }
}

#[test]
fn test_largest_reuse_window_is_accepted() -> TestResult {
    let (path, _config, _temp_dir) = ConfigBuilder::minimal()
        .with_reuse_window(MAX_REUSE_WINDOW_SECONDS)
        .write_toml();

    assert_eq!(
        load_config(&path)?.backup.reuse_window_seconds,
        MAX_REUSE_WINDOW_SECONDS
    );
    Ok(())
}
