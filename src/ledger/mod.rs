//! Ledger module containing deduplication, merging, record construction and the tracker

pub mod core;
pub mod dedup;
pub mod merge;
pub mod record;

pub use self::core::*;
pub use dedup::*;
pub use merge::*;
pub use record::{ForecastEntry, RecordBuilder};
