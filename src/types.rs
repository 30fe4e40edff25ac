//! Core types and data structures for the flow reconciliation system

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a fund transaction relative to the fund
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Money entering the fund (subscriptions, transfers in, capital calls)
    Inflow,
    /// Money leaving the fund (redemptions, transfers out, distributions)
    Outflow,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Inflow => "inflow",
            Direction::Outflow => "outflow",
        }
    }

    /// Parse the stored representation written by [`Direction::as_str`]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "inflow" => Some(Direction::Inflow),
            "outflow" => Some(Direction::Outflow),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical fields every admin report is mapped onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    /// Investor identifier
    InvestorId,
    /// Investor display name
    InvestorName,
    /// Fund type / feeder / share class grouping
    FundType,
    /// Transaction amount
    Amount,
    /// Effective (dealing) date
    TransactionDate,
    /// Free-text transaction type, classified into a direction
    TransactionType,
    /// Optional free-text notes
    Notes,
}

impl CanonicalField {
    /// Fields a report must provide before any row is processed
    pub const REQUIRED: [CanonicalField; 6] = [
        CanonicalField::InvestorId,
        CanonicalField::InvestorName,
        CanonicalField::FundType,
        CanonicalField::Amount,
        CanonicalField::TransactionDate,
        CanonicalField::TransactionType,
    ];

    /// Fields used when present, ignored when absent
    pub const OPTIONAL: [CanonicalField; 1] = [CanonicalField::Notes];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::InvestorId => "investor_id",
            CanonicalField::InvestorName => "investor_name",
            CanonicalField::FundType => "fund_type",
            CanonicalField::Amount => "amount",
            CanonicalField::TransactionDate => "transaction_date",
            CanonicalField::TransactionType => "transaction_type",
            CanonicalField::Notes => "notes",
        }
    }

    /// Look up a field by its canonical name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::REQUIRED
            .iter()
            .chain(Self::OPTIONAL.iter())
            .find(|field| field.as_str() == name)
            .copied()
    }

    pub fn is_required(&self) -> bool {
        Self::REQUIRED.contains(self)
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized investor transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// Unique identifier of the investor
    pub entity_id: String,
    /// Investor display name
    pub entity_name: String,
    /// Fund type or sector
    pub category: String,
    /// Raw transaction-type term the direction was derived from
    pub transaction_type: String,
    /// Flow direction
    pub direction: Direction,
    /// Non-negative magnitude of the flow
    pub amount: BigDecimal,
    /// Effective date of the transaction
    pub occurred_on: NaiveDate,
    /// True for speculative entries, false for confirmed actuals
    pub is_forecast: bool,
    /// Optional free-text notes
    pub notes: Option<String>,
}

impl CanonicalRecord {
    /// Create a confirmed (actual) record
    pub fn actual(
        entity_id: String,
        entity_name: String,
        category: String,
        direction: Direction,
        amount: BigDecimal,
        occurred_on: NaiveDate,
    ) -> Self {
        Self {
            entity_id,
            entity_name,
            category,
            transaction_type: direction.as_str().to_string(),
            direction,
            amount,
            occurred_on,
            is_forecast: false,
            notes: None,
        }
    }

    /// Create a forecast record
    pub fn forecast(
        entity_id: String,
        entity_name: String,
        category: String,
        direction: Direction,
        amount: BigDecimal,
        occurred_on: NaiveDate,
    ) -> Self {
        Self {
            is_forecast: true,
            ..Self::actual(entity_id, entity_name, category, direction, amount, occurred_on)
        }
    }

    /// Identity of the record for existence checks
    pub fn match_key(&self) -> MatchKey {
        MatchKey::new(&self.entity_id, self.occurred_on, &self.amount)
    }

    /// Signed contribution to net flow (inflows positive, outflows negative)
    pub fn signed_amount(&self) -> BigDecimal {
        match self.direction {
            Direction::Inflow => self.amount.clone(),
            Direction::Outflow => -self.amount.clone(),
        }
    }

    /// Check the record invariants
    pub fn validate(&self) -> FlowResult<()> {
        if self.entity_id.trim().is_empty() {
            return Err(FlowError::Validation(
                "Record entity ID cannot be empty".to_string(),
            ));
        }

        if self.amount < BigDecimal::from(0) {
            return Err(FlowError::Validation(format!(
                "Record amount must be non-negative, got {}",
                self.amount
            )));
        }

        Ok(())
    }
}

/// Identity of a transaction: two records with the same key are the same
/// real-world event regardless of their other fields
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatchKey {
    pub entity_id: String,
    pub occurred_on: NaiveDate,
    /// Amount in normalized form so `500000` and `500000.00` compare equal
    pub amount: BigDecimal,
}

impl MatchKey {
    pub fn new(entity_id: &str, occurred_on: NaiveDate, amount: &BigDecimal) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            occurred_on,
            amount: amount.normalized(),
        }
    }
}

/// Ordered collection of records, always sorted by `occurred_on`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<CanonicalRecord>", into = "Vec<CanonicalRecord>")]
pub struct Ledger {
    records: Vec<CanonicalRecord>,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from records in any order; ties keep their relative order
    pub fn from_records(mut records: Vec<CanonicalRecord>) -> Self {
        records.sort_by_key(|r| r.occurred_on);
        Self { records }
    }

    pub fn records(&self) -> &[CanonicalRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<CanonicalRecord> {
        self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CanonicalRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Confirmed records in ledger order
    pub fn actuals(&self) -> impl Iterator<Item = &CanonicalRecord> {
        self.records.iter().filter(|r| !r.is_forecast)
    }

    /// Forecast records in ledger order
    pub fn forecasts(&self) -> impl Iterator<Item = &CanonicalRecord> {
        self.records.iter().filter(|r| r.is_forecast)
    }

    /// Check whether the ledger satisfies its ordering invariant
    pub fn is_sorted(&self) -> bool {
        self.records
            .windows(2)
            .all(|pair| pair[0].occurred_on <= pair[1].occurred_on)
    }
}

impl From<Vec<CanonicalRecord>> for Ledger {
    fn from(records: Vec<CanonicalRecord>) -> Self {
        Self::from_records(records)
    }
}

impl From<Ledger> for Vec<CanonicalRecord> {
    fn from(ledger: Ledger) -> Self {
        ledger.records
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a CanonicalRecord;
    type IntoIter = std::slice::Iter<'a, CanonicalRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Summary statistics for one processed report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationStats {
    /// Rows merged into the ledger
    pub new_entries: usize,
    /// Ledger length after the merge
    pub total_records: usize,
    /// Sum of newly merged inflow amounts
    pub inflow_amount: BigDecimal,
    /// Sum of newly merged outflow amounts
    pub outflow_amount: BigDecimal,
    /// `inflow_amount - outflow_amount`
    pub net_flow: BigDecimal,
    /// Rows whose transaction type matched no keyword
    pub skipped_unclassified: usize,
    /// Rows already present in the ledger
    pub skipped_duplicate: usize,
    /// Rows with an unreadable identifier, date or amount
    pub skipped_unparseable: usize,
}

impl Default for ReconciliationStats {
    fn default() -> Self {
        Self {
            new_entries: 0,
            total_records: 0,
            inflow_amount: BigDecimal::from(0),
            outflow_amount: BigDecimal::from(0),
            net_flow: BigDecimal::from(0),
            skipped_unclassified: 0,
            skipped_duplicate: 0,
            skipped_unparseable: 0,
        }
    }
}

/// Why a report row did not make it into the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowIssueKind {
    Unclassified,
    Unparseable,
    Duplicate,
}

/// A dropped report row, numbered from 1 for the first data row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowIssue {
    pub row: usize,
    pub kind: RowIssueKind,
    pub message: String,
}

/// Result of reconciling one report against a ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationOutcome {
    pub ledger: Ledger,
    pub stats: ReconciliationStats,
    pub issues: Vec<RowIssue>,
}

/// Error tags exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowErrorKind {
    MissingColumns,
    Parse,
    Io,
    Config,
    Storage,
    Validation,
}

/// Errors that can occur while reconciling flows
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("Missing required columns: {}", join_fields(.0))]
    MissingColumns(Vec<CanonicalField>),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

impl FlowError {
    pub fn kind(&self) -> FlowErrorKind {
        match self {
            FlowError::MissingColumns(_) => FlowErrorKind::MissingColumns,
            FlowError::Parse(_) => FlowErrorKind::Parse,
            FlowError::Io(_) => FlowErrorKind::Io,
            FlowError::Config(_) => FlowErrorKind::Config,
            FlowError::Storage(_) => FlowErrorKind::Storage,
            FlowError::Validation(_) => FlowErrorKind::Validation,
        }
    }

    /// Canonical names of the unresolved fields, for `MissingColumns` only
    pub fn missing_fields(&self) -> Option<Vec<&'static str>> {
        match self {
            FlowError::MissingColumns(fields) => {
                Some(fields.iter().map(CanonicalField::as_str).collect())
            }
            _ => None,
        }
    }
}

fn join_fields(fields: &[CanonicalField]) -> String {
    fields
        .iter()
        .map(CanonicalField::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<csv::Error> for FlowError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            match err.into_kind() {
                csv::ErrorKind::Io(io) => FlowError::Io(io),
                other => FlowError::Parse(format!("{other:?}")),
            }
        } else {
            FlowError::Parse(err.to_string())
        }
    }
}

/// Result type for flow operations
pub type FlowResult<T> = Result<T, FlowError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_match_key_ignores_trailing_zeros() {
        let a = MatchKey::new("INV001", date(2024, 3, 1), &BigDecimal::from(500000));
        let b = MatchKey::new(
            "INV001",
            date(2024, 3, 1),
            &BigDecimal::from_str("500000.00").unwrap(),
        );
        assert_eq!(a, b);

        let c = MatchKey::new(
            "INV001",
            date(2024, 3, 1),
            &BigDecimal::from_str("500000.01").unwrap(),
        );
        assert_ne!(a, c);
    }

    #[test]
    fn test_ledger_from_records_is_stable() {
        let first = CanonicalRecord::actual(
            "A".to_string(),
            "Alpha".to_string(),
            "Fund".to_string(),
            Direction::Inflow,
            BigDecimal::from(1),
            date(2024, 2, 1),
        );
        let second = CanonicalRecord {
            entity_id: "B".to_string(),
            ..first.clone()
        };
        let earlier = CanonicalRecord {
            entity_id: "C".to_string(),
            occurred_on: date(2024, 1, 1),
            ..first.clone()
        };

        let ledger = Ledger::from_records(vec![first, second, earlier]);
        let ids: Vec<_> = ledger.iter().map(|r| r.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["C", "A", "B"]);
        assert!(ledger.is_sorted());
    }

    #[test]
    fn test_record_validation() {
        let mut record = CanonicalRecord::actual(
            "INV001".to_string(),
            "Alpha".to_string(),
            "Feeder A".to_string(),
            Direction::Outflow,
            BigDecimal::from(100),
            date(2024, 3, 5),
        );
        assert!(record.validate().is_ok());
        assert_eq!(record.signed_amount(), BigDecimal::from(-100));

        record.amount = BigDecimal::from(-1);
        assert!(matches!(record.validate(), Err(FlowError::Validation(_))));

        record.amount = BigDecimal::from(1);
        record.entity_id = "  ".to_string();
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_missing_columns_error_lists_fields() {
        let err = FlowError::MissingColumns(vec![
            CanonicalField::FundType,
            CanonicalField::Amount,
        ]);
        assert_eq!(err.kind(), FlowErrorKind::MissingColumns);
        assert_eq!(err.missing_fields(), Some(vec!["fund_type", "amount"]));
        assert_eq!(
            err.to_string(),
            "Missing required columns: fund_type, amount"
        );
    }

    #[test]
    fn test_deserialized_ledger_is_sorted() {
        let json = r#"[
            {"entity_id": "INV002", "entity_name": "Beta", "category": "Feeder B",
             "transaction_type": "Redemption", "direction": "outflow", "amount": "250.50",
             "occurred_on": "2024-04-02", "is_forecast": false, "notes": null},
            {"entity_id": "INV001", "entity_name": "Alpha", "category": "Feeder A",
             "transaction_type": "Subscription", "direction": "inflow", "amount": "1000",
             "occurred_on": "2024-01-15", "is_forecast": true, "notes": "pipeline"}
        ]"#;

        let ledger: Ledger = serde_json::from_str(json).unwrap();
        assert!(ledger.is_sorted());
        assert_eq!(ledger.records()[0].entity_id, "INV001");
        assert_eq!(ledger.forecasts().count(), 1);
        assert_eq!(ledger.records()[1].amount, BigDecimal::from_str("250.5").unwrap());

        let round_trip: Ledger =
            serde_json::from_str(&serde_json::to_string(&ledger).unwrap()).unwrap();
        assert_eq!(round_trip, ledger);
    }
}
