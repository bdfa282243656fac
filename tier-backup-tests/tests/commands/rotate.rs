//! Rotation tests against a real destination directory

use std::fs;
use test_utils::*;
use tier_backup::utils::manifest::Manifest;

const DAILIES: [&str; 5] = [
    "testapp-daily-2025:01:01.tar.gz",
    "testapp-daily-2025:01:02.tar.gz",
    "testapp-daily-2025:01:03.tar.gz",
    "testapp-daily-2025:01:04.tar.gz",
    "testapp-daily-2025:01:05.tar.gz",
];

#[test]
fn test_keeps_newest_daily_artifacts() -> TestResult {
    let ctx = TestContext::from_builder(ConfigBuilder::minimal().daily(3));
    ctx.create_artifacts_in_order(&DAILIES);
    let reporter = RecordingReporter::new();

    let report = ctx.rotator(&reporter).rotate(false)?;

    assert_eq!(report.scanned, 5);
    assert_eq!(report.deleted.len(), 2);
    assert!(report.failed.is_empty());
    assert_eq!(ctx.artifact_names(), DAILIES[2..].to_vec());
    assert_eq!(
        reporter.count(|e| matches!(e, RunEvent::Deleted { tier: Tier::Daily, .. })),
        2
    );
    Ok(())
}

#[test]
fn test_second_rotation_is_a_no_op() -> TestResult {
    let ctx = TestContext::from_builder(ConfigBuilder::minimal().daily(3));
    ctx.create_artifacts_in_order(&DAILIES);

    ctx.rotator(&RecordingReporter::new()).rotate(false)?;

    let reporter = RecordingReporter::new();
    let report = ctx.rotator(&reporter).rotate(false)?;

    assert!(report.expired.is_empty());
    assert_eq!(reporter.events(), vec![RunEvent::NothingToRotate]);
    assert_eq!(ctx.artifact_names().len(), 3);
    Ok(())
}

#[test]
fn test_dry_run_deletes_nothing() -> TestResult {
    let ctx = TestContext::from_builder(ConfigBuilder::minimal().daily(3));
    ctx.create_artifacts_in_order(&DAILIES);
    let reporter = RecordingReporter::new();

    let report = ctx.rotator(&reporter).rotate(true)?;

    assert_eq!(report.expired.len(), 2);
    assert!(report.deleted.is_empty());
    assert_eq!(ctx.artifact_names().len(), 5);
    assert_eq!(
        reporter.count(|e| matches!(e, RunEvent::Deleting { .. })),
        2
    );
    assert_eq!(
        reporter.count(|e| matches!(e, RunEvent::Deleted { .. })),
        0
    );
    Ok(())
}

#[test]
fn test_disabled_tier_is_purged() -> TestResult {
    let ctx = TestContext::from_builder(ConfigBuilder::minimal().daily(3));
    ctx.create_artifacts_in_order(&[
        "testapp-weekly-2024:12:22.tar.gz",
        "testapp-weekly-2024:12:29.tar.gz",
        "testapp-daily-2025:01:02.tar.gz",
    ]);

    ctx.rotator(&RecordingReporter::new()).rotate(false)?;

    assert_eq!(ctx.artifact_names(), vec!["testapp-daily-2025:01:02.tar.gz"]);
    Ok(())
}

#[test]
fn test_directory_artifacts_are_removed() -> TestResult {
    let ctx = TestContext::from_builder(ConfigBuilder::minimal().with_extension("").monthly(1));
    ctx.create_directory_artifact("testapp-monthly-2025:01:01");
    std::thread::sleep(std::time::Duration::from_millis(20));
    ctx.create_directory_artifact("testapp-monthly-2025:02:01");

    let report = ctx.rotator(&RecordingReporter::new()).rotate(false)?;

    assert_eq!(report.deleted.len(), 1);
    assert_eq!(ctx.artifact_names(), vec!["testapp-monthly-2025:02:01"]);
    Ok(())
}

#[test]
fn test_foreign_files_are_untouched() -> TestResult {
    let ctx = TestContext::from_builder(ConfigBuilder::minimal());
    ctx.create_artifact("otherapp-daily-2025:01:01.tar.gz");
    ctx.create_artifact("notes.txt");
    ctx.create_artifact("testapp-daily-2025:01:01.tar.gz");

    ctx.rotator(&RecordingReporter::new()).rotate(false)?;

    assert_eq!(
        ctx.artifact_names(),
        vec!["notes.txt", "otherapp-daily-2025:01:01.tar.gz"]
    );
    Ok(())
}

#[test]
fn test_manifest_tier_overrides_name() -> TestResult {
    let ctx = TestContext::from_builder(ConfigBuilder::minimal().daily(5));
    ctx.create_artifact("testapp-daily-2025:01:01.tar.gz");
    ctx.create_artifact("testapp-snapshot.tar.gz");

    let mut manifest = Manifest::new("testapp");
    manifest.record("testapp-daily-2025:01:01.tar.gz", Tier::Hourly);
    manifest.record("testapp-snapshot.tar.gz", Tier::Hourly);
    manifest.save(&Manifest::path_for(&ctx.destination(), "testapp"))?;

    let report = ctx.rotator(&RecordingReporter::new()).rotate(false)?;

    assert_eq!(report.deleted.len(), 2);
    assert!(ctx.artifact_names().is_empty());
    assert!(ctx.manifest().entries.is_empty());
    Ok(())
}

#[test]
fn test_project_name_containing_tier_word() -> TestResult {
    let ctx = TestContext::from_builder(
        ConfigBuilder::minimal()
            .with_project("hourly-stats")
            .hourly(5)
            .daily(1),
    );
    ctx.create_artifacts_in_order(&[
        "hourly-stats-daily-2025:01:01.tar.gz",
        "hourly-stats-daily-2025:01:02.tar.gz",
        "hourly-stats-hourly-2025:01:02-10:00:00.tar.gz",
    ]);

    let report = ctx.rotator(&RecordingReporter::new()).rotate(false)?;

    assert_eq!(report.deleted.len(), 1);
    assert_eq!(
        ctx.artifact_names(),
        vec![
            "hourly-stats-daily-2025:01:02.tar.gz",
            "hourly-stats-hourly-2025:01:02-10:00:00.tar.gz",
        ]
    );
    Ok(())
}

#[test]
fn test_corrupt_manifest_is_reported_and_ignored() -> TestResult {
    let ctx = TestContext::from_builder(ConfigBuilder::minimal().daily(3));
    ctx.create_artifacts_in_order(&DAILIES);
    fs::write(
        Manifest::path_for(&ctx.destination(), "testapp"),
        "{ not json",
    )?;
    let reporter = RecordingReporter::new();

    let report = ctx.rotator(&reporter).rotate(false)?;

    assert_eq!(report.deleted.len(), 2);
    assert!(reporter.count(|e| matches!(e, RunEvent::ManifestProblem { .. })) >= 1);
    Ok(())
}

#[test]
fn test_missing_destination_is_not_an_error() -> TestResult {
    let ctx = TestContext::from_builder(ConfigBuilder::minimal().daily(3));
    let reporter = RecordingReporter::new();

    let report = ctx.rotator(&reporter).rotate(false)?;

    assert_eq!(report.scanned, 0);
    assert!(reporter.contains(&RunEvent::NothingToRotate));
    Ok(())
}

#[test]
fn test_failed_deletion_does_not_stop_rotation() -> TestResult {
    let ctx = TestContext::from_builder(ConfigBuilder::minimal().daily(1));
    let paths = ctx.create_artifacts_in_order(&DAILIES[..3]);
    let reporter = RecordingReporter::new();
    let rotator = ctx.rotator(&reporter);

    let scanned = rotator.scan()?;
    fs::remove_file(&paths[0])?;

    let report = rotator.rotate_scanned(&scanned, false);

    assert_eq!(report.expired.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, paths[0]);
    assert_eq!(report.deleted, vec![paths[1].clone()]);
    assert_eq!(
        reporter.count(|e| matches!(e, RunEvent::DeletionFailed { path, .. } if *path == paths[0])),
        1
    );
    assert_eq!(ctx.artifact_names(), vec![DAILIES[2]]);
    Ok(())
}

#[test]
fn test_failed_deletion_keeps_manifest_entry() -> TestResult {
    let ctx = TestContext::from_builder(ConfigBuilder::minimal().daily(1));
    ctx.create_artifacts_in_order(&DAILIES[..3]);

    let mut manifest = Manifest::new("testapp");
    for name in &DAILIES[..3] {
        manifest.record(name, Tier::Daily);
    }
    manifest.save(&Manifest::path_for(&ctx.destination(), "testapp"))?;

    let rotator = ctx.rotator(&RecordingReporter::new());
    let mut scanned = rotator.scan()?;
    // The oldest artifact stays on disk but its recorded path cannot be removed.
    for artifact in scanned.iter_mut().filter(|a| a.name == DAILIES[0]) {
        artifact.path = ctx.destination().join("missing").join(&artifact.name);
    }

    let report = rotator.rotate_scanned(&scanned, false);

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.deleted.len(), 1);
    let manifest = ctx.manifest();
    assert_eq!(manifest.tier_of(DAILIES[0]), Some(Tier::Daily));
    assert_eq!(manifest.tier_of(DAILIES[1]), None);
    assert_eq!(manifest.tier_of(DAILIES[2]), Some(Tier::Daily));
    Ok(())
}
