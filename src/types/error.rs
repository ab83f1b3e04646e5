use thiserror::Error;

/// contribstats error types
#[derive(Error, Debug)]
pub enum StatsError {
    /// An observation in the batch had a malformed date or a negative count
    #[error("invalid observation '{date}': {reason}")]
    InvalidObservation { date: String, reason: String },

    /// Username was empty
    #[error("invalid identity: username must not be empty")]
    InvalidIdentity,

    /// Interval selector not one of today/daily/weekly/monthly
    #[error(
        "Could not find feed for interval '{0}'. Please try 'today', 'daily', 'weekly' or 'monthly'."
    )]
    UnknownInterval(String),

    /// Observation feed failed to produce data
    #[error("feed error: {0}")]
    Feed(String),

    /// Persistence operation failed
    #[error("store error: {0}")]
    Store(String),

    /// Failed to parse JSON
    #[error("parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for contribstats
pub type Result<T> = std::result::Result<T, StatsError>;
