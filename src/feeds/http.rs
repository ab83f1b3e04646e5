//! HTTP feed for a JSON contributions API
//!
//! Expects `GET <base_url>/<username>` to answer with either payload shape
//! accepted by [`parse_payload`](super::parse_payload).

use crate::types::{RawObservation, Result, StatsError};
use std::time::Duration;
use tracing::debug;

use super::{check_username, parse_payload, ObservationFeed};

/// Default contributions API
pub const DEFAULT_API_URL: &str = "https://github-contributions-api.jogruber.de/v4";

/// HTTP request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 10;

pub struct HttpFeed {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpFeed {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("contribstats/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StatsError::Feed(format!("HTTP client error: {}", e)))?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    pub fn url_for(&self, username: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), username)
    }
}

impl ObservationFeed for HttpFeed {
    fn name(&self) -> &str {
        "http"
    }

    fn fetch(&self, username: &str) -> Result<Vec<RawObservation>> {
        check_username(username)?;

        let url = self.url_for(username);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| StatsError::Feed(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StatsError::Feed(format!("HTTP {} from {}", status, url)));
        }

        let mut body = response
            .bytes()
            .map_err(|e| StatsError::Feed(format!("Failed to read response: {}", e)))?
            .to_vec();
        parse_payload(&mut body)
    }
}
