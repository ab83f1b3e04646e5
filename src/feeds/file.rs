//! JSON file feed: one `<username>.json` per user in a directory

use crate::types::{RawObservation, Result, StatsError};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

use super::{check_username, parse_payload, ObservationFeed};

/// Feed backed by a directory of exported contribution files
pub struct JsonFileFeed {
    dir: PathBuf,
}

impl JsonFileFeed {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn feed_path(&self, username: &str) -> PathBuf {
        self.dir.join(format!("{}.json", username))
    }

    /// Usernames with a feed file in the directory, sorted
    pub fn usernames(&self) -> Vec<String> {
        let pattern = self.dir.join("*.json");
        let mut names: Vec<String> = glob::glob(&pattern.to_string_lossy())
            .map(|paths| {
                paths
                    .filter_map(|e| e.ok())
                    .filter(|p| p.is_file())
                    .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(String::from))
                    .filter(|name| check_username(name).is_ok())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }
}

impl ObservationFeed for JsonFileFeed {
    fn name(&self) -> &str {
        "file"
    }

    fn fetch(&self, username: &str) -> Result<Vec<RawObservation>> {
        check_username(username)?;

        let path = self.feed_path(username);
        if !path.exists() {
            return Err(StatsError::Feed(format!(
                "No feed for user '{}' in {}",
                username,
                self.dir.display()
            )));
        }

        let mut bytes = fs::read(&path)
            .map_err(|e| StatsError::Feed(format!("Failed to read {:?}: {}", path, e)))?;
        let observations = parse_payload(&mut bytes)?;
        debug!(
            "Loaded {} observations for {} from {:?}",
            observations.len(),
            username,
            path
        );
        Ok(observations)
    }
}
