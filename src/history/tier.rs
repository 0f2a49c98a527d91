use crate::error::HistoryError;
use chrono::{DateTime, Days, Months, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Retention-and-granularity level of the time-series store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageTier {
    Primary,
    Weekly,
    Monthly,
    Yearly,
}

/// Retention window of a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retention {
    Days(u64),
    Months(u32),
}

impl Retention {
    /// Oldest timestamp still retained at `now`.
    pub fn cutoff(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Days(days) => now.checked_sub_days(Days::new(days)),
            Self::Months(months) => now.checked_sub_months(Months::new(months)),
        }
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

impl StorageTier {
    pub const ALL: [StorageTier; 4] = [
        StorageTier::Primary,
        StorageTier::Weekly,
        StorageTier::Monthly,
        StorageTier::Yearly,
    ];

    /// Bucket (table) holding this tier's points.
    pub const fn bucket(self) -> &'static str {
        match self {
            Self::Primary => "metrics",
            Self::Weekly => "metrics_weekly",
            Self::Monthly => "metrics_monthly",
            Self::Yearly => "metrics_yearly",
        }
    }

    /// `None` keeps points forever.
    pub const fn retention(self) -> Option<Retention> {
        match self {
            Self::Primary => Some(Retention::Days(15)),
            Self::Weekly => Some(Retention::Days(9 * 7)),
            Self::Monthly => Some(Retention::Months(25)),
            Self::Yearly => None,
        }
    }

    /// Duration key whose own range this tier serves inside a nested query.
    pub const fn served_key(self) -> DurationKey {
        match self {
            Self::Primary => DurationKey::Week,
            Self::Weekly => DurationKey::Month,
            Self::Monthly => DurationKey::Year,
            Self::Yearly => DurationKey::Forever,
        }
    }
}

impl fmt::Display for StorageTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.bucket())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub stop: DateTime<Utc>,
}

impl TimeRange {
    /// Half-open: `start <= ts < stop`.
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.start <= timestamp && timestamp < self.stop
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationKey {
    Week,
    Month,
    Year,
    Forever,
}

fn months_back(now: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(months))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

impl DurationKey {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
            Self::Forever => "forever",
        }
    }

    /// This key's own slice of time. Consecutive keys tile the past ten
    /// years without overlap.
    pub fn range(self, now: DateTime<Utc>) -> TimeRange {
        let week_ago = now.checked_sub_days(Days::new(7)).unwrap_or(DateTime::<Utc>::MIN_UTC);
        let (start, stop) = match self {
            Self::Week => (week_ago, now),
            Self::Month => (months_back(now, 1), week_ago),
            Self::Year => (months_back(now, 12), months_back(now, 1)),
            Self::Forever => (months_back(now, 120), months_back(now, 12)),
        };
        TimeRange { start, stop }
    }

    /// Tiers consulted for this key, finest first.
    pub const fn tiers(self) -> &'static [StorageTier] {
        match self {
            Self::Week => &[StorageTier::Primary],
            Self::Month => &[StorageTier::Primary, StorageTier::Weekly],
            Self::Year => &[StorageTier::Primary, StorageTier::Weekly, StorageTier::Monthly],
            Self::Forever => &StorageTier::ALL,
        }
    }
}

impl fmt::Display for DurationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DurationKey {
    type Err = HistoryError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            "forever" => Ok(Self::Forever),
            _ => Err(HistoryError::UnknownDurationKey(raw.to_string())),
        }
    }
}
