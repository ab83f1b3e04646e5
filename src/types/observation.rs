//! Observation types: one day's activity count from a profile feed

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use super::{Result, StatsError};

/// Strict `YYYY-MM-DD` shape; chrono alone also accepts unpadded fields.
static DATE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

/// Unvalidated `(date, count)` pair as supplied by a feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawObservation {
    pub date: String,
    #[serde(default)]
    pub count: i64,
}

impl RawObservation {
    pub fn new(date: impl Into<String>, count: i64) -> Self {
        Self {
            date: date.into(),
            count,
        }
    }
}

/// A validated observation. Immutable once built.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Observation {
    pub date: NaiveDate,
    pub count: u64,
}

impl Observation {
    pub fn new(date: NaiveDate, count: u64) -> Self {
        Self { date, count }
    }

    /// Validate a single raw observation.
    pub fn parse(raw: &RawObservation) -> Result<Self> {
        let invalid = |reason: String| StatsError::InvalidObservation {
            date: raw.date.clone(),
            reason,
        };

        if !DATE_SHAPE.is_match(&raw.date) {
            return Err(invalid("expected YYYY-MM-DD".into()));
        }
        let date = NaiveDate::parse_from_str(&raw.date, "%Y-%m-%d")
            .map_err(|_| invalid("not a calendar date".into()))?;
        let count =
            u64::try_from(raw.count).map_err(|_| invalid(format!("negative count {}", raw.count)))?;

        Ok(Self { date, count })
    }

    /// Validate a whole batch. The first bad observation rejects the batch.
    pub fn parse_batch(raw: &[RawObservation]) -> Result<Vec<Self>> {
        raw.iter().map(Self::parse).collect()
    }
}
