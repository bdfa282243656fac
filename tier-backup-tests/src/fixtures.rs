//! Test fixtures and sample data
//!
//! Provides pre-built test data and templates for testing.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone};
use std::path::{Path, PathBuf};
use tier_backup::managers::rotation::Artifact;
use tier_backup::policy::Tier;

/// Calendar date shorthand
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Wall-clock timestamp shorthand
pub fn at(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> NaiveDateTime {
    date(year, month, day)
        .and_hms_opt(hour, min, sec)
        .expect("valid time")
}

/// Local timestamp shorthand (midday avoids DST gaps)
pub fn local_noon(year: i32, month: u32, day: u32) -> DateTime<Local> {
    Local
        .from_local_datetime(&at(year, month, day, 12, 0, 0))
        .single()
        .expect("unambiguous local time")
}

/// An in-memory artifact created `minutes_ago` before a fixed reference time
pub fn artifact(name: &str, tier: Tier, minutes_ago: i64) -> Artifact {
    Artifact {
        path: PathBuf::from("/backups").join(name),
        name: name.to_string(),
        tier,
        created: local_noon(2025, 6, 10) - Duration::minutes(minutes_ago),
    }
}

/// `count` artifacts of one tier, one day apart, oldest first
pub fn artifacts_for_tier(project: &str, tier: Tier, count: usize) -> Vec<Artifact> {
    (0..count)
        .map(|i| {
            let day = (i % 28) as u32 + 1;
            let name = format!("{}-{}-2025:05:{:02}", project, tier, day);
            artifact(&name, tier, ((count - i) as i64) * 24 * 60)
        })
        .collect()
}

/// Names of artifacts, in order
pub fn names(artifacts: &[Artifact]) -> Vec<String> {
    artifacts.iter().map(|a| a.name.clone()).collect()
}

/// Minimal valid config TOML template
pub fn minimal_config_toml(source: &Path, destination: &Path) -> String {
    format!(
        r#"
[backup]
project = "testapp"
source = "{}"
destination = "{}"
extension = ".tar.gz"

[retention]
daily = 7
weekly = 4
monthly = 6
yearly = 1

[methods.tar]
enabled = true
"#,
        source.display(),
        destination.display()
    )
}

/// Config in the legacy flat JSON layout
pub fn legacy_config_json(source: &Path, destination: &Path) -> String {
    format!(
        r#"{{
    "SRC_DIR": "{}",
    "BACKUP_DIR": "{}",
    "PROJECT_NAME": "testapp",
    "BACKUP_RETENTION_HOURLY": 24,
    "BACKUP_RETENTION_DAILY": 7,
    "BACKUP_RETENTION_WEEKLY": 4,
    "BACKUP_RETENTION_MONTHLY": 6,
    "BACKUP_RETENTION_YEARLY": 1
}}"#,
        source.display(),
        destination.display()
    )
}
