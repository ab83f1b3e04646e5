//! Interval selector for summary requests

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::StatsError;

/// Which view a summary request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    /// Single entry for the current date
    Today,
    /// Sparse per-day counts
    Daily,
    /// Totals per weekday
    Weekly,
    /// Totals per month of year
    Monthly,
}

impl Interval {
    pub const ALL: [Interval; 4] = [
        Interval::Today,
        Interval::Daily,
        Interval::Weekly,
        Interval::Monthly,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|i| i.as_str() == s)
            .ok_or_else(|| StatsError::UnknownInterval(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_intervals() {
        for interval in Interval::ALL {
            assert_eq!(interval.as_str().parse::<Interval>().unwrap(), interval);
        }
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert!("Daily".parse::<Interval>().is_err());
    }

    #[test]
    fn test_parse_unknown_interval() {
        let err = "yearly".parse::<Interval>().unwrap_err();
        assert!(matches!(err, StatsError::UnknownInterval(ref s) if s == "yearly"));
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Interval::Weekly).unwrap(), "\"weekly\"");
    }
}
