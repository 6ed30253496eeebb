use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The time window a leaderboard is scoped to. Each window defines a lower
/// bound on `created_at`; `AllTime` has none.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFilter {
    #[default]
    AllTime,
    Today,
    ThisWeek,
    ThisMonth,
}

impl TimeFilter {
    pub const ALL: [TimeFilter; 4] = [
        TimeFilter::AllTime,
        TimeFilter::ThisMonth,
        TimeFilter::ThisWeek,
        TimeFilter::Today,
    ];

    /// The wire name, as used in query strings and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFilter::AllTime => "all_time",
            TimeFilter::Today => "today",
            TimeFilter::ThisWeek => "this_week",
            TimeFilter::ThisMonth => "this_month",
        }
    }

    /// A human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            TimeFilter::AllTime => "All Time",
            TimeFilter::Today => "Today",
            TimeFilter::ThisWeek => "This Week",
            TimeFilter::ThisMonth => "This Month",
        }
    }
}

impl fmt::Display for TimeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all_time" => Ok(TimeFilter::AllTime),
            "today" => Ok(TimeFilter::Today),
            "this_week" => Ok(TimeFilter::ThisWeek),
            "this_month" => Ok(TimeFilter::ThisMonth),
            other => Err(CoreError::UnknownFilter(other.to_string())),
        }
    }
}
