//! Tier selection and artifact naming

use chrono::{Datelike, NaiveDate, Weekday};
use proptest::prelude::*;
use rstest::rstest;
use test_utils::{at, date, ArtifactNamer, RetentionPolicy, Tier};
use tier_backup::policy::select_base_tier;

fn retention(weekly: u32, monthly: u32, yearly: u32) -> RetentionPolicy {
    RetentionPolicy {
        hourly: 0,
        daily: 7,
        weekly,
        monthly,
        yearly,
    }
}

#[rstest]
// January 1st: yearly wins over monthly
#[case(date(2025, 1, 1), retention(1, 1, 1), Tier::Yearly)]
#[case(date(2025, 1, 1), retention(1, 1, 0), Tier::Monthly)]
#[case(date(2025, 1, 1), retention(1, 0, 0), Tier::Daily)]
// 2023-01-01 is a Sunday
#[case(date(2023, 1, 1), retention(1, 0, 0), Tier::Weekly)]
// First of the month
#[case(date(2025, 3, 1), retention(1, 1, 1), Tier::Monthly)]
#[case(date(2025, 3, 1), retention(1, 0, 1), Tier::Daily)]
// Sunday
#[case(date(2025, 3, 9), retention(1, 1, 1), Tier::Weekly)]
#[case(date(2025, 3, 9), retention(0, 1, 1), Tier::Daily)]
// Plain weekday
#[case(date(2025, 3, 11), retention(1, 1, 1), Tier::Daily)]
fn test_select_base_tier(
    #[case] day: NaiveDate,
    #[case] policy: RetentionPolicy,
    #[case] expected: Tier,
) {
    assert_eq!(select_base_tier(day, &policy), expected);
}

#[test]
fn test_daily_is_selected_even_when_disabled() {
    let disabled = RetentionPolicy::default();
    let tier = select_base_tier(date(2025, 3, 11), &disabled);
    assert_eq!(tier, Tier::Daily);
    assert!(!disabled.is_enabled(tier));
}

proptest! {
    #[test]
    fn base_tier_follows_calendar_rules(
        year in 1990i32..2100,
        ordinal in 1u32..=365,
        weekly in 0u32..3,
        monthly in 0u32..3,
        yearly in 0u32..3,
    ) {
        let day = NaiveDate::from_yo_opt(year, ordinal).unwrap();
        let policy = retention(weekly, monthly, yearly);
        let tier = select_base_tier(day, &policy);

        prop_assert!(tier != Tier::Hourly);
        match tier {
            Tier::Yearly => prop_assert!(day.ordinal() == 1 && yearly > 0),
            Tier::Monthly => {
                prop_assert!(day.day() == 1 && monthly > 0);
                prop_assert!(!(day.ordinal() == 1 && yearly > 0));
            }
            Tier::Weekly => {
                prop_assert!(day.weekday() == Weekday::Sun && weekly > 0);
                prop_assert!(!(day.day() == 1 && monthly > 0));
                prop_assert!(!(day.ordinal() == 1 && yearly > 0));
            }
            Tier::Daily => {
                prop_assert!(!(day.ordinal() == 1 && yearly > 0));
                prop_assert!(!(day.day() == 1 && monthly > 0));
                prop_assert!(!(day.weekday() == Weekday::Sun && weekly > 0));
            }
            Tier::Hourly => unreachable!(),
        }
    }

    #[test]
    fn generated_names_classify_to_their_tier(
        tier_index in 0usize..5,
        hour in 0u32..24,
        minute in 0u32..60,
    ) {
        let tier = Tier::ALL[tier_index];
        let namer = ArtifactNamer::new("/backups", "site", ".tar.gz");
        let name = namer.artifact_name(tier, at(2025, 7, 14, hour, minute, 0), tier == Tier::Hourly);
        prop_assert_eq!(namer.classify(&name), Some(tier));
    }
}

#[test]
fn test_hourly_runs_in_same_second_collide() {
    let namer = ArtifactNamer::new("/backups", "site", "");
    let first = namer.hourly_path(at(2025, 7, 14, 10, 0, 5));
    let second = namer.hourly_path(at(2025, 7, 14, 10, 0, 5));
    let later = namer.hourly_path(at(2025, 7, 14, 11, 0, 5));

    assert_eq!(first, second);
    assert_ne!(first, later);
}

#[test]
fn test_base_path_ignores_time_of_day() {
    let namer = ArtifactNamer::new("/backups", "site", ".tar.gz");
    assert_eq!(
        namer.base_path(Tier::Daily, at(2025, 7, 14, 0, 0, 1)),
        namer.base_path(Tier::Daily, at(2025, 7, 14, 23, 59, 59))
    );
}
