//! contribstats: re-aggregate a contribution calendar into daily,
//! weekday and monthly views, with optional per-user persistence.

pub mod config;
pub mod feeds;
pub mod services;
pub mod types;
