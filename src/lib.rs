//! # Fundflow Core
//!
//! Reconciliation of fund administrator reports against an investor-flow
//! ledger of confirmed (actual) and expected (forecast) transactions.
//!
//! ## Features
//!
//! - **Report loading**: CSV and spreadsheet workbooks with arbitrary header names
//! - **Column matching**: configurable alias table with manual overrides
//! - **Classification**: keyword-based inflow / outflow detection
//! - **Deduplication**: exact matching on investor, date and amount
//! - **Forecast preservation**: new actuals never disturb manual forecasts
//! - **Analytics**: per-investor summaries and monthly net flows
//! - **Storage abstraction**: trait-based persistence with memory and CSV backends
//!
//! ## Quick Start
//!
//! ```rust
//! use fundflow_core::{CellValue, Ledger, RawReport, ReconciliationEngine};
//!
//! let report = RawReport::from_rows(
//!     vec![
//!         "Unique ID".into(),
//!         "Investor Name".into(),
//!         "Fund Type".into(),
//!         "Amount".into(),
//!         "Dealing Date".into(),
//!         "Sub/Trans/Red".into(),
//!     ],
//!     vec![vec![
//!         CellValue::text("INV001"),
//!         CellValue::text("Alpha Pension"),
//!         CellValue::text("Feeder A"),
//!         CellValue::text("500,000"),
//!         CellValue::text("01/03/2024"),
//!         CellValue::text("Subscription"),
//!     ]],
//! );
//!
//! let engine = ReconciliationEngine::default();
//! let outcome = engine.process_raw_report(&report, &Ledger::new()).unwrap();
//! assert_eq!(outcome.stats.new_entries, 1);
//! ```

pub mod analytics;
pub mod config;
pub mod ledger;
pub mod reconciliation;
pub mod report;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use analytics::{investor_summary, monthly_net_flows, FlowSummary, InvestorFlows, MonthlyFlow};
pub use config::ReconciliationConfig;
pub use ledger::*;
pub use reconciliation::*;
pub use report::{load_report, CellValue, RawReport, RawRow};
pub use traits::*;
pub use types::*;

// Re-export record patterns for convenience
pub use ledger::record::patterns;
