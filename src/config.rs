//! Runtime configuration
//!
//! Resolved once from CLI flags (which also read `CONTRIBSTATS_*`
//! environment variables) with defaults under `~/.contribstats/`.

use std::path::PathBuf;

use directories::BaseDirs;

use crate::feeds::http::DEFAULT_API_URL;
use crate::services::Calendar;
use crate::types::{Result, StatsError};

/// Default bucket-name locale
pub const DEFAULT_LOCALE: &str = "en_US";

#[derive(Debug, Clone)]
pub struct Config {
    /// Root for persisted data (`users/` lives below it)
    pub data_dir: PathBuf,
    /// Locale for weekday/month bucket names
    pub calendar: Calendar,
    /// Base URL of the contributions API
    pub api_url: String,
}

impl Config {
    pub fn resolve(
        data_dir: Option<PathBuf>,
        locale: Option<&str>,
        api_url: Option<String>,
    ) -> Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => Self::default_data_dir()?,
        };
        let calendar = Calendar::from_name(locale.unwrap_or(DEFAULT_LOCALE))?;

        Ok(Self {
            data_dir,
            calendar,
            api_url: api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        })
    }

    /// `~/.contribstats`
    pub fn default_data_dir() -> Result<PathBuf> {
        let base_dirs = BaseDirs::new()
            .ok_or_else(|| StatsError::Config("Cannot determine home directory".into()))?;
        Ok(base_dirs.home_dir().join(".contribstats"))
    }

    /// Directory holding one document per user
    pub fn users_dir(&self) -> PathBuf {
        self.data_dir.join("users")
    }
}
