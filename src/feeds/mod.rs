//! Observation feeds: sources of raw `(date, count)` pairs per username

mod file;
pub mod http;

pub use file::JsonFileFeed;
pub use http::HttpFeed;

use crate::types::{RawObservation, Result, StatsError};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Usernames a feed will look up (letters, digits, `-` and `_`)
static USERNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid regex"));

/// Trait for sources of contribution observations
pub trait ObservationFeed: Send + Sync {
    /// Feed name (e.g., "file", "http")
    fn name(&self) -> &str;

    /// Fetch every observation for `username`, unvalidated
    fn fetch(&self, username: &str) -> Result<Vec<RawObservation>>;
}

/// Accepted payload shapes: a bare array, or an object with a
/// `contributions` array (other fields ignored).
#[derive(Deserialize)]
#[serde(untagged)]
enum FeedPayload {
    Wrapped { contributions: Vec<RawObservation> },
    Bare(Vec<RawObservation>),
}

/// Parse a feed payload in place (simd-json mutates the buffer)
pub fn parse_payload(bytes: &mut [u8]) -> Result<Vec<RawObservation>> {
    let payload: FeedPayload =
        simd_json::from_slice(bytes).map_err(|e| StatsError::Parse(e.to_string()))?;
    Ok(match payload {
        FeedPayload::Wrapped { contributions } => contributions,
        FeedPayload::Bare(observations) => observations,
    })
}

/// Reject usernames a feed cannot safely put in a path or URL
pub(crate) fn check_username(username: &str) -> Result<()> {
    if username.is_empty() {
        return Err(StatsError::InvalidIdentity);
    }
    if !USERNAME.is_match(username) {
        return Err(StatsError::Feed(format!(
            "Invalid username '{}'",
            username
        )));
    }
    Ok(())
}

/// In-memory feed
#[derive(Debug, Default, Clone)]
pub struct MemoryFeed {
    users: HashMap<String, Vec<RawObservation>>,
}

impl MemoryFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, username: &str, observations: Vec<RawObservation>) -> Self {
        self.users.insert(username.to_string(), observations);
        self
    }
}

impl ObservationFeed for MemoryFeed {
    fn name(&self) -> &str {
        "memory"
    }

    fn fetch(&self, username: &str) -> Result<Vec<RawObservation>> {
        self.users
            .get(username)
            .cloned()
            .ok_or_else(|| StatsError::Feed(format!("No feed for user '{}'", username)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_payload_bare_array() {
        let mut bytes = br#"[{"date":"2024-01-01","count":3},{"date":"2024-01-02","count":0}]"#.to_vec();
        let result = parse_payload(&mut bytes).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0], RawObservation::new("2024-01-01", 3));
    }

    #[test]
    fn test_parse_payload_wrapped_ignores_extra_fields() {
        let mut bytes = br#"{
            "total": {"2024": 3},
            "contributions": [
                {"date": "2024-01-01", "count": 3, "level": 2}
            ]
        }"#
        .to_vec();
        let result = parse_payload(&mut bytes).unwrap();
        assert_eq!(result, vec![RawObservation::new("2024-01-01", 3)]);
    }

    #[test]
    fn test_parse_payload_keeps_negative_counts_for_validation() {
        let mut bytes = br#"[{"date":"2024-01-01","count":-2}]"#.to_vec();
        let result = parse_payload(&mut bytes).unwrap();
        assert_eq!(result[0].count, -2);
    }

    #[test]
    fn test_parse_payload_invalid_json() {
        let mut bytes = b"not json {{{".to_vec();
        assert!(matches!(parse_payload(&mut bytes), Err(StatsError::Parse(_))));
    }

    #[test]
    fn test_parse_payload_wrong_shape() {
        let mut bytes = br#"{"days": []}"#.to_vec();
        assert!(parse_payload(&mut bytes).is_err());
    }

    #[test]
    fn test_check_username() {
        assert!(check_username("droxey").is_ok());
        assert!(check_username("some-user_1").is_ok());
        assert!(matches!(check_username(""), Err(StatsError::InvalidIdentity)));
        assert!(matches!(check_username("../etc"), Err(StatsError::Feed(_))));
        assert!(matches!(check_username("a/b"), Err(StatsError::Feed(_))));
    }

    #[test]
    fn test_memory_feed() {
        let feed = MemoryFeed::new().with_user("octocat", vec![RawObservation::new("2024-01-01", 1)]);
        assert_eq!(feed.fetch("octocat").unwrap().len(), 1);
        assert!(matches!(feed.fetch("ghost"), Err(StatsError::Feed(_))));
    }
}
