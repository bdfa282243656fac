//! Full run tests: creation followed by rotation

use test_utils::*;

#[test]
fn test_run_creates_then_rotates() -> TestResult {
    let ctx = TestContext::from_builder(ConfigBuilder::minimal().daily(3));
    ctx.create_artifacts_in_order(&[
        "testapp-daily-2025:03:06.tar.gz",
        "testapp-daily-2025:03:07.tar.gz",
        "testapp-daily-2025:03:10.tar.gz",
    ]);
    let archiver = MockArchiveOps::new();
    let reporter = RecordingReporter::new();
    let manager = ctx.manager(&archiver, &reporter);

    let report = manager.run(local_noon(2025, 3, 11))?;

    assert!(matches!(report.creation.base, ArtifactOutcome::Created(_)));
    assert_eq!(report.rotation.scanned, 4);
    assert_eq!(report.rotation.kept(), 3);
    assert_eq!(
        ctx.artifact_names(),
        vec![
            "testapp-daily-2025:03:07.tar.gz",
            "testapp-daily-2025:03:10.tar.gz",
            "testapp-daily-2025:03:11.tar.gz",
        ]
    );
    Ok(())
}

#[test]
fn test_failed_creation_skips_rotation() {
    let ctx = TestContext::from_builder(ConfigBuilder::minimal().daily(1));
    ctx.create_artifacts_in_order(&[
        "testapp-daily-2025:03:09.tar.gz",
        "testapp-daily-2025:03:10.tar.gz",
    ]);
    let archiver = MockArchiveOps::new().failing();
    let reporter = RecordingReporter::new();
    let manager = ctx.manager(&archiver, &reporter);

    manager
        .run(local_noon(2025, 3, 11))
        .assert_err_contains("Failed to create daily backup");

    assert_eq!(ctx.artifact_names().len(), 2);
    assert_eq!(
        reporter.count(|e| matches!(e, RunEvent::Deleting { .. } | RunEvent::NothingToRotate)),
        0
    );
}

#[test]
fn test_idempotent_run_still_rotates() -> TestResult {
    let ctx = TestContext::from_builder(ConfigBuilder::minimal().daily(2));
    let archiver = MockArchiveOps::new();
    let manager = ctx.manager(&archiver, &RecordingReporter::new());

    manager.run(local_noon(2025, 3, 11))?;
    std::thread::sleep(std::time::Duration::from_millis(20));
    ctx.create_artifacts_in_order(&[
        "testapp-daily-2025:03:01.tar.gz",
        "testapp-daily-2025:03:02.tar.gz",
    ]);

    let report = manager.run(local_noon(2025, 3, 11))?;

    assert!(report.creation.nothing_created());
    assert_eq!(archiver.call_count(), 1);

    // Age comes from the filesystem, not from the date in the name.
    assert_eq!(
        report.rotation.deleted,
        vec![ctx.destination().join("testapp-daily-2025:03:11.tar.gz")]
    );
    assert_eq!(ctx.artifact_names().len(), 2);
    Ok(())
}
