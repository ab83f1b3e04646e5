//! Type definitions for contribstats

mod error;
mod interval;
mod observation;
mod summary;

pub use error::*;
pub use interval::Interval;
pub use observation::{Observation, RawObservation};
pub use summary::*;
