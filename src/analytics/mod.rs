//! Read-only views over a ledger: per-investor totals and monthly net flows

pub mod monthly;
pub mod summary;

pub use monthly::*;
pub use summary::*;
