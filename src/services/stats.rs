//! Stats service: feed → aggregation → record, optionally persisted
//!
//! Single entry point shared by the CLI subcommands.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::feeds::ObservationFeed;
use crate::services::{Aggregator, Calendar, Clock, SummaryBuilder, UserStore};
use crate::types::{
    Contributions, Interval, Observation, PersistedUserDocument, Result, StatsError,
    SummaryRecord,
};

/// Outcome of refreshing one user in a batch
pub type RefreshOutcome = (String, Result<PersistedUserDocument>);

pub struct StatsService {
    feed: Box<dyn ObservationFeed>,
    store: Option<Box<dyn UserStore>>,
    clock: Arc<dyn Clock>,
    calendar: Calendar,
}

impl StatsService {
    pub fn new(feed: Box<dyn ObservationFeed>, clock: Arc<dyn Clock>, calendar: Calendar) -> Self {
        Self {
            feed,
            store: None,
            clock,
            calendar,
        }
    }

    pub fn with_store(mut self, store: Box<dyn UserStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Fetch and validate observations for `username`
    fn observations(&self, username: &str) -> Result<Vec<Observation>> {
        debug!("Fetching {} from {} feed", username, self.feed.name());
        let raw = self.feed.fetch(username)?;
        Observation::parse_batch(&raw)
    }

    /// Build the summary record for one interval
    pub fn summarize(&self, username: &str, interval: Interval) -> Result<SummaryRecord> {
        let observations = self.observations(username)?;
        self.record(username, interval, &observations)
    }

    /// Compute all views for `username` and upsert them
    pub fn refresh(&self, username: &str) -> Result<PersistedUserDocument> {
        let store = self.store()?;
        let observations = self.observations(username)?;
        let views = Aggregator::views(&observations, &self.calendar);
        store.upsert(username, &views)
    }

    /// Summarize one interval and upsert all views from a single fetch
    pub fn summarize_and_refresh(
        &self,
        username: &str,
        interval: Interval,
    ) -> Result<(SummaryRecord, PersistedUserDocument)> {
        let store = self.store()?;
        let observations = self.observations(username)?;

        let record = self.record(username, interval, &observations)?;
        let views = Aggregator::views(&observations, &self.calendar);
        let doc = store.upsert(username, &views)?;
        Ok((record, doc))
    }

    /// Load the persisted document for `username`
    pub fn fetch(&self, username: &str) -> Result<Option<PersistedUserDocument>> {
        self.store()?.fetch(username)
    }

    /// Refresh many users in parallel; one failure does not stop the rest
    pub fn refresh_all(&self, usernames: &[String]) -> Vec<RefreshOutcome> {
        let outcomes: Vec<RefreshOutcome> = usernames
            .par_iter()
            .map(|username| (username.clone(), self.refresh(username)))
            .collect();

        let failed = outcomes.iter().filter(|(_, r)| r.is_err()).count();
        for (username, result) in &outcomes {
            if let Err(e) = result {
                warn!("Refresh of {} failed: {}", username, e);
            }
        }
        info!(
            "Refreshed {} of {} users from {} feed",
            outcomes.len() - failed,
            outcomes.len(),
            self.feed.name()
        );

        outcomes
    }

    fn store(&self) -> Result<&dyn UserStore> {
        self.store
            .as_deref()
            .ok_or_else(|| StatsError::Config("No store configured".into()))
    }

    fn record(
        &self,
        username: &str,
        interval: Interval,
        observations: &[Observation],
    ) -> Result<SummaryRecord> {
        let contributions = match interval {
            Interval::Today | Interval::Daily => Contributions::Daily(Aggregator::daily_view(
                observations,
                interval == Interval::Today,
                self.clock.today(),
            )),
            Interval::Weekly => {
                Contributions::Buckets(Aggregator::weekly(observations, &self.calendar))
            }
            Interval::Monthly => {
                Contributions::Buckets(Aggregator::monthly(observations, &self.calendar))
            }
        };

        SummaryBuilder::build(username, contributions, self.clock.as_ref())
    }
}
