//! Reconciliation of fund administrator reports against the investor-flow ledger
//!
//! Header resolution, transaction classification and the engine that ties
//! them to deduplication and merging.

pub mod classifier;
pub mod columns;
pub mod engine;

pub use classifier::*;
pub use columns::*;
pub use engine::*;
