//! Summary record builder
//!
//! Stamps an aggregation result with its username and the time it was built.

use crate::services::Clock;
use crate::types::{Contributions, Result, StatsError, SummaryRecord};

pub struct SummaryBuilder;

impl SummaryBuilder {
    /// Build a record. The only identity check is that the username is non-empty;
    /// whether the user exists is the feed's concern.
    pub fn build(
        username: &str,
        contributions: Contributions,
        clock: &dyn Clock,
    ) -> Result<SummaryRecord> {
        if username.trim().is_empty() {
            return Err(StatsError::InvalidIdentity);
        }

        Ok(SummaryRecord {
            contributions,
            username: username.to_string(),
            last_updated: clock.now(),
        })
    }
}
