//! Services for aggregation, record building and persistence

pub mod aggregator;
pub mod calendar;
pub mod clock;
pub mod stats;
pub mod store;
pub mod summary;

pub use aggregator::Aggregator;
pub use calendar::Calendar;
pub use clock::{Clock, FixedClock, SteppingClock, SystemClock};
pub use stats::StatsService;
pub use store::{JsonFileStore, MemoryStore, UserStore};
pub use summary::SummaryBuilder;
