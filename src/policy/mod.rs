//! Tier selection policy
//!
//! Decides which retention tier is due for a calendar day and how artifacts
//! of each tier are named on disk.

mod naming;

pub use naming::{ArtifactNamer, DAY_FORMAT, TIMESTAMP_FORMAT};

use crate::config::RetentionPolicy;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A backup frequency bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Tier {
    /// Every tier, in rotation order
    pub const ALL: [Tier; 5] = [
        Tier::Hourly,
        Tier::Daily,
        Tier::Weekly,
        Tier::Monthly,
        Tier::Yearly,
    ];

    /// Tag embedded in artifact names
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Hourly => "hourly",
            Tier::Daily => "daily",
            Tier::Weekly => "weekly",
            Tier::Monthly => "monthly",
            Tier::Yearly => "yearly",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_lowercase();
        Tier::ALL
            .iter()
            .copied()
            .find(|tier| tier.as_str() == wanted)
            .ok_or_else(|| format!("unknown tier: {}", s))
    }
}

/// Select the base tier due on `date`.
///
/// Rules are checked in priority order and the first match wins:
/// yearly on January 1st, monthly on the first of the month, weekly on
/// Sundays, each only when its retention is non-zero. Anything else is
/// `Daily`, which is returned even when daily retention is zero. Callers
/// must check `retention.is_enabled(tier)` before creating anything.
pub fn select_base_tier(date: NaiveDate, retention: &RetentionPolicy) -> Tier {
    if date.ordinal() == 1 && retention.is_enabled(Tier::Yearly) {
        return Tier::Yearly;
    }
    if date.day() == 1 && retention.is_enabled(Tier::Monthly) {
        return Tier::Monthly;
    }
    if date.weekday() == Weekday::Sun && retention.is_enabled(Tier::Weekly) {
        return Tier::Weekly;
    }
    Tier::Daily
}
