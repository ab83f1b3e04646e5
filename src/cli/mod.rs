use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use contribstats::config::Config;
use contribstats::feeds::{HttpFeed, JsonFileFeed, ObservationFeed};
use contribstats::services::{Clock, JsonFileStore, StatsService, SystemClock, UserStore};
use contribstats::types::{Interval, StatsError};

/// Contribution calendar statistics
#[derive(Parser)]
#[command(name = "contribstats")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory for persisted user documents
    #[arg(long, global = true, value_name = "DIR", env = "CONTRIBSTATS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Locale for weekday and month names (e.g. en_US, fr_FR)
    #[arg(long, global = true, value_name = "NAME", env = "CONTRIBSTATS_LOCALE")]
    locale: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize one user's contributions for an interval
    Stats {
        /// today, daily, weekly or monthly
        interval: Interval,

        /// Profile username
        username: String,

        /// Read `<USERNAME>.json` from this directory instead of the API
        #[arg(long, value_name = "DIR")]
        feed_dir: Option<PathBuf>,

        /// Contributions API base URL (ignored with --feed-dir)
        #[arg(long, value_name = "URL", env = "CONTRIBSTATS_API_URL")]
        api_url: Option<String>,

        /// Also persist all views for the user
        #[arg(long)]
        save: bool,
    },

    /// Print a user's persisted document
    Show {
        /// Profile username
        username: String,
    },

    /// Refresh and persist every user found in a feed directory
    Batch {
        /// Directory of `<username>.json` feed files
        #[arg(long, value_name = "DIR")]
        feed_dir: PathBuf,
    },
}

impl Cli {
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        }
    }

    pub fn run(self) -> anyhow::Result<()> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        match self.command {
            Commands::Stats {
                interval,
                username,
                feed_dir,
                api_url,
                save,
            } => {
                let config = Config::resolve(self.data_dir, self.locale.as_deref(), api_url)?;
                let feed: Box<dyn ObservationFeed> = match feed_dir {
                    Some(dir) => Box::new(JsonFileFeed::new(dir)),
                    None => Box::new(HttpFeed::new(config.api_url.clone())?),
                };
                let service = build_service(&config, feed, clock);

                if save {
                    let (record, doc) = service.summarize_and_refresh(&username, interval)?;
                    info!("Saved {} (last updated {})", doc.username, doc.last_updated);
                    return print_json(&record);
                }
                print_json(&service.summarize(&username, interval)?)
            }
            Commands::Show { username } => {
                let config = Config::resolve(self.data_dir, self.locale.as_deref(), None)?;
                let store = JsonFileStore::with_dir(config.users_dir(), clock);

                let doc = store.fetch(&username)?.ok_or_else(|| {
                    StatsError::Store(format!("No document stored for '{}'", username))
                })?;
                print_json(&doc)
            }
            Commands::Batch { feed_dir } => {
                let config = Config::resolve(self.data_dir, self.locale.as_deref(), None)?;
                let feed = JsonFileFeed::new(feed_dir);
                let usernames = feed.usernames();
                let service = build_service(&config, Box::new(feed), clock);

                let outcomes = service.refresh_all(&usernames);
                let failed = outcomes.iter().filter(|(_, r)| r.is_err()).count();
                for (username, result) in &outcomes {
                    match result {
                        Ok(doc) => println!("ok      {} ({})", username, doc.last_updated),
                        Err(e) => println!("failed  {}: {}", username, e),
                    }
                }

                if failed > 0 {
                    anyhow::bail!("{} of {} users failed", failed, outcomes.len());
                }
                Ok(())
            }
        }
    }
}

fn build_service(
    config: &Config,
    feed: Box<dyn ObservationFeed>,
    clock: Arc<dyn Clock>,
) -> StatsService {
    let store = JsonFileStore::with_dir(config.users_dir(), Arc::clone(&clock));
    StatsService::new(feed, clock, config.calendar).with_store(Box::new(store))
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| StatsError::Parse(e.to_string()))?;
    println!("{}", json);
    Ok(())
}
