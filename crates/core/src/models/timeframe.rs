use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::CoreError;

/// How far back the chart looks from "now".
///
/// Each timeframe maps to a fixed bucket layout via [`Timeframe::spec`];
/// the layout, not the caller, decides chart resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Timeframe {
    Hour,
    Day,
    Week,
    Month,
    Year,
    All,
}

/// Bucket layout for one timeframe: how many buckets and how wide each is.
/// `bucket_count * bucket_duration` always equals the covered span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeframeSpec {
    pub bucket_count: usize,
    pub bucket_duration: Duration,
}

impl TimeframeSpec {
    /// Total span covered by the bucket sequence.
    pub fn span(&self) -> Duration {
        self.bucket_duration * (self.bucket_count as i32)
    }
}

impl Timeframe {
    /// Resolve the fixed bucket layout for this timeframe.
    pub fn spec(&self) -> TimeframeSpec {
        let (bucket_count, bucket_duration) = match self {
            Timeframe::Hour => (60, Duration::minutes(1)),
            Timeframe::Day => (288, Duration::minutes(5)),
            Timeframe::Week => (168, Duration::hours(1)),
            Timeframe::Month => (360, Duration::hours(2)),
            Timeframe::Year => (52, Duration::weeks(1)),
            Timeframe::All => (260, Duration::weeks(1)),
        };
        TimeframeSpec {
            bucket_count,
            bucket_duration,
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            Timeframe::Hour => "HOUR",
            Timeframe::Day => "DAY",
            Timeframe::Week => "WEEK",
            Timeframe::Month => "MONTH",
            Timeframe::Year => "YEAR",
            Timeframe::All => "ALL",
        };
        write!(f, "{tag}")
    }
}

impl FromStr for Timeframe {
    type Err = CoreError;

    /// Parse a textual timeframe tag, case-insensitively.
    /// Unrecognized tags are the one fatal input error in the library.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "HOUR" => Ok(Timeframe::Hour),
            "DAY" => Ok(Timeframe::Day),
            "WEEK" => Ok(Timeframe::Week),
            "MONTH" => Ok(Timeframe::Month),
            "YEAR" => Ok(Timeframe::Year),
            "ALL" => Ok(Timeframe::All),
            other => Err(CoreError::InvalidTimeframe(other.to_string())),
        }
    }
}
