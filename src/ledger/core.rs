//! Tracker that coordinates storage, reconciliation and forecasts

use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::analytics::{self, FlowSummary, MonthlyFlow};
use crate::ledger::record::ForecastEntry;
use crate::reconciliation::{ColumnOverrides, ReconciliationEngine};
use crate::traits::*;
use crate::types::*;

/// Result of one file in a batch ingest
#[derive(Debug)]
pub struct BatchEntry {
    pub path: PathBuf,
    pub result: FlowResult<ReconciliationOutcome>,
}

impl BatchEntry {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Investor-flow tracker backed by a [`LedgerStorage`]
///
/// Every operation loads the current ledger, computes a new one and saves it.
/// Nothing is saved when an operation fails.
pub struct FlowTracker<S: LedgerStorage> {
    storage: S,
    engine: ReconciliationEngine,
}

impl<S: LedgerStorage> FlowTracker<S> {
    /// Create a tracker with the default reconciliation settings
    pub fn new(storage: S) -> Self {
        Self::with_engine(storage, ReconciliationEngine::default())
    }

    /// Create a tracker with a custom engine
    pub fn with_engine(storage: S, engine: ReconciliationEngine) -> Self {
        Self { storage, engine }
    }

    pub fn engine(&self) -> &ReconciliationEngine {
        &self.engine
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Current persisted ledger
    pub async fn ledger(&self) -> FlowResult<Ledger> {
        self.storage.load_ledger().await
    }

    /// Reconcile one report and persist the result
    pub async fn ingest_report(
        &mut self,
        path: impl AsRef<Path>,
    ) -> FlowResult<ReconciliationOutcome> {
        self.ingest_report_with_overrides(path, &ColumnOverrides::new())
            .await
    }

    /// Reconcile one report with manual column overrides and persist the result
    pub async fn ingest_report_with_overrides(
        &mut self,
        path: impl AsRef<Path>,
        overrides: &ColumnOverrides,
    ) -> FlowResult<ReconciliationOutcome> {
        let ledger = self.storage.load_ledger().await?;
        let outcome = self
            .engine
            .process_report_with_overrides(path, &ledger, overrides)?;
        self.storage.save_ledger(&outcome.ledger).await?;
        Ok(outcome)
    }

    /// Ingest several reports in order.
    ///
    /// Each file is reconciled against the ledger left by the previous one and
    /// persisted on success. A failing file is logged, leaves the ledger as it
    /// was and does not stop the batch.
    pub async fn ingest_reports<P: AsRef<Path>>(&mut self, paths: &[P]) -> Vec<BatchEntry> {
        let mut entries = Vec::with_capacity(paths.len());

        for path in paths {
            let path = path.as_ref();
            let result = self.ingest_report(path).await;

            if let Err(err) = &result {
                warn!("Failed to ingest {}: {err}", path.display());
            }
            entries.push(BatchEntry {
                path: path.to_path_buf(),
                result,
            });
        }

        let succeeded = entries.iter().filter(|e| e.is_ok()).count();
        info!(
            "Batch complete: {succeeded} of {} reports ingested",
            entries.len()
        );
        entries
    }

    /// Add a manual forecast and persist the result
    pub async fn add_forecast(&mut self, entry: ForecastEntry) -> FlowResult<Ledger> {
        let ledger = self.storage.load_ledger().await?;
        let updated = self.engine.add_forecast(&ledger, entry)?;
        self.storage.save_ledger(&updated).await?;
        Ok(updated)
    }

    /// Add a manual forecast checked by a custom validator
    pub async fn add_forecast_with_validator(
        &mut self,
        entry: ForecastEntry,
        validator: &dyn RecordValidator,
    ) -> FlowResult<Ledger> {
        let ledger = self.storage.load_ledger().await?;
        let updated = self
            .engine
            .add_forecast_with_validator(&ledger, entry, validator)?;
        self.storage.save_ledger(&updated).await?;
        Ok(updated)
    }

    /// Per-investor summary of the persisted ledger
    pub async fn investor_summary(&self) -> FlowResult<FlowSummary> {
        let ledger = self.storage.load_ledger().await?;
        Ok(analytics::investor_summary(&ledger))
    }

    /// Monthly net flows of the persisted ledger
    pub async fn monthly_net_flows(&self) -> FlowResult<Vec<MonthlyFlow>> {
        let ledger = self.storage.load_ledger().await?;
        Ok(analytics::monthly_net_flows(&ledger))
    }
}
