//! Report-to-ledger reconciliation

use bigdecimal::BigDecimal;
use log::{debug, info, warn};
use std::path::Path;

use super::classifier::TransactionClassifier;
use super::columns::{ColumnMapping, ColumnMatcher, ColumnOverrides};
use crate::config::ReconciliationConfig;
use crate::ledger::dedup::Deduplicator;
use crate::ledger::merge::LedgerMerger;
use crate::ledger::record::{ForecastEntry, RecordBuilder};
use crate::report::{self, parse_amount, parse_date, text_value, CellValue, RawReport, RawRow};
use crate::traits::*;
use crate::types::*;

/// Reconciles fund administrator reports against a ledger snapshot.
///
/// The engine is immutable once built and never touches storage: it takes a
/// ledger and returns a new one.
#[derive(Debug, Clone)]
pub struct ReconciliationEngine {
    config: ReconciliationConfig,
    matcher: ColumnMatcher,
    classifier: TransactionClassifier,
}

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self::build(ReconciliationConfig::default())
    }
}

impl ReconciliationEngine {
    /// Create an engine from a validated configuration
    pub fn new(config: ReconciliationConfig) -> FlowResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: ReconciliationConfig) -> Self {
        Self {
            matcher: ColumnMatcher::new(&config),
            classifier: TransactionClassifier::new(&config),
            config,
        }
    }

    /// A new engine using a different configuration
    pub fn with_config(&self, config: ReconciliationConfig) -> FlowResult<Self> {
        Self::new(config)
    }

    pub fn config(&self) -> &ReconciliationConfig {
        &self.config
    }

    pub fn classifier(&self) -> &TransactionClassifier {
        &self.classifier
    }

    /// Load a report file and reconcile it against `ledger`
    pub fn process_report(
        &self,
        path: impl AsRef<Path>,
        ledger: &Ledger,
    ) -> FlowResult<ReconciliationOutcome> {
        self.process_report_with_overrides(path, ledger, &ColumnOverrides::new())
    }

    /// Load a report file and reconcile it, pinning some columns by exact header
    pub fn process_report_with_overrides(
        &self,
        path: impl AsRef<Path>,
        ledger: &Ledger,
        overrides: &ColumnOverrides,
    ) -> FlowResult<ReconciliationOutcome> {
        let path = path.as_ref();
        let raw = report::load_report(path)?;
        let outcome = self.process_raw_report_with_overrides(&raw, ledger, overrides)?;

        info!(
            "Processed {}: {} new, {} duplicate, {} unclassified, {} unparseable, ledger now {} records",
            path.display(),
            outcome.stats.new_entries,
            outcome.stats.skipped_duplicate,
            outcome.stats.skipped_unclassified,
            outcome.stats.skipped_unparseable,
            outcome.stats.total_records,
        );
        Ok(outcome)
    }

    /// Reconcile an already loaded report
    pub fn process_raw_report(
        &self,
        report: &RawReport,
        ledger: &Ledger,
    ) -> FlowResult<ReconciliationOutcome> {
        self.process_raw_report_with_overrides(report, ledger, &ColumnOverrides::new())
    }

    /// Reconcile an already loaded report with manual column overrides.
    ///
    /// Fails only when required columns cannot be resolved. Individual rows that
    /// cannot be classified, parsed or that already exist are skipped, counted and
    /// reported in `issues`.
    pub fn process_raw_report_with_overrides(
        &self,
        report: &RawReport,
        ledger: &Ledger,
        overrides: &ColumnOverrides,
    ) -> FlowResult<ReconciliationOutcome> {
        let mapping = match self.matcher.resolve_all(report.headers(), overrides) {
            Ok(mapping) => mapping,
            Err(err) => {
                warn!("{err}; report headers were: {}", report.headers().join(", "));
                return Err(err);
            }
        };

        let mut stats = ReconciliationStats::default();
        let mut issues = Vec::new();
        let existing = Deduplicator::existing_keys(ledger);
        let mut fresh = Vec::new();

        for (index, row) in report.rows().iter().enumerate() {
            let row_number = index + 1;

            let record = match self.extract_record(row, &mapping) {
                Ok(record) => record,
                Err((kind, message)) => {
                    match kind {
                        RowIssueKind::Unclassified => stats.skipped_unclassified += 1,
                        _ => stats.skipped_unparseable += 1,
                    }
                    debug!("Skipping row {row_number}: {message}");
                    issues.push(RowIssue {
                        row: row_number,
                        kind,
                        message,
                    });
                    continue;
                }
            };

            if Deduplicator::is_duplicate(&existing, &record) {
                stats.skipped_duplicate += 1;
                let message = format!(
                    "{} {} on {} is already in the ledger",
                    record.entity_id, record.amount, record.occurred_on
                );
                debug!("Skipping row {row_number}: {message}");
                issues.push(RowIssue {
                    row: row_number,
                    kind: RowIssueKind::Duplicate,
                    message,
                });
                continue;
            }

            match record.direction {
                Direction::Inflow => stats.inflow_amount += &record.amount,
                Direction::Outflow => stats.outflow_amount += &record.amount,
            }
            fresh.push(record);
        }

        stats.new_entries = fresh.len();
        stats.net_flow = &stats.inflow_amount - &stats.outflow_amount;

        let merged = LedgerMerger::merge(ledger, fresh);
        stats.total_records = merged.len();

        Ok(ReconciliationOutcome {
            ledger: merged,
            stats,
            issues,
        })
    }

    /// Classify, parse and build the candidate record for one row
    fn extract_record(
        &self,
        row: &RawRow,
        mapping: &ColumnMapping,
    ) -> Result<CanonicalRecord, (RowIssueKind, String)> {
        let cell = |field: CanonicalField| cell_for(row, mapping, field);

        let raw_type = text_value(cell(CanonicalField::TransactionType)).unwrap_or_default();
        let direction = self.classifier.classify(&raw_type).ok_or_else(|| {
            (
                RowIssueKind::Unclassified,
                format!("transaction type '{raw_type}' matches no inflow or outflow keyword"),
            )
        })?;

        let unparseable = |message: String| (RowIssueKind::Unparseable, message);

        let entity_id = text_value(cell(CanonicalField::InvestorId))
            .ok_or_else(|| unparseable("investor ID is missing".to_string()))?;
        let occurred_on = parse_date(cell(CanonicalField::TransactionDate), &self.config.date_formats)
            .map_err(|e| unparseable(format!("transaction date: {e}")))?;
        let amount = parse_amount(cell(CanonicalField::Amount))
            .map_err(|e| unparseable(format!("amount: {e}")))?;

        RecordBuilder::new(entity_id, occurred_on, direction, amount)
            .entity_name(text_value(cell(CanonicalField::InvestorName)).unwrap_or_default())
            .category(text_value(cell(CanonicalField::FundType)).unwrap_or_default())
            .transaction_type(raw_type)
            .notes(text_value(cell(CanonicalField::Notes)))
            .build()
            .map_err(|e| unparseable(e.to_string()))
    }

    /// Add a manually entered forecast, classifying its transaction type
    pub fn add_forecast(&self, ledger: &Ledger, entry: ForecastEntry) -> FlowResult<Ledger> {
        self.add_forecast_with_validator(ledger, entry, &DefaultRecordValidator)
    }

    /// Add a manually entered forecast using a custom validator
    pub fn add_forecast_with_validator(
        &self,
        ledger: &Ledger,
        entry: ForecastEntry,
        validator: &dyn RecordValidator,
    ) -> FlowResult<Ledger> {
        let direction = self.classifier.classify(&entry.transaction_type).ok_or_else(|| {
            FlowError::Validation(format!(
                "Invalid transaction type: {}. Must be an inflow or outflow type",
                entry.transaction_type
            ))
        })?;

        if entry.amount < BigDecimal::from(0) {
            return Err(FlowError::Validation(
                "Forecast amount cannot be negative".to_string(),
            ));
        }

        // Trimmed like report cells
        let notes = entry
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from);
        let record = RecordBuilder::new(
            entry.entity_id.trim(),
            entry.occurred_on,
            direction,
            entry.amount,
        )
        .entity_name(entry.entity_name.trim())
        .category(entry.category.trim())
        .transaction_type(entry.transaction_type.trim())
        .notes(notes)
        .forecast()
        .build()?;

        LedgerMerger::add_forecast_with_validator(ledger, record, validator)
    }
}

fn cell_for<'a>(row: &'a RawRow, mapping: &ColumnMapping, field: CanonicalField) -> &'a CellValue {
    match mapping.header_for(field) {
        Some(header) => row.get(header),
        None => &CellValue::Empty,
    }
}
