//! Ledger persisted as a single CSV file

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::traits::*;
use crate::types::*;

/// Column order of the ledger file
pub const LEDGER_HEADER: [&str; 9] = [
    "entity_id",
    "entity_name",
    "category",
    "transaction_type",
    "direction",
    "amount",
    "occurred_on",
    "is_forecast",
    "notes",
];

#[derive(Debug, Deserialize)]
struct StoredRow {
    entity_id: String,
    entity_name: String,
    category: String,
    transaction_type: String,
    direction: String,
    amount: String,
    occurred_on: String,
    is_forecast: String,
    notes: Option<String>,
}

#[derive(Debug, Serialize)]
struct StoredRowOut<'a> {
    entity_id: &'a str,
    entity_name: &'a str,
    category: &'a str,
    transaction_type: &'a str,
    direction: &'a str,
    amount: String,
    occurred_on: String,
    is_forecast: bool,
    notes: Option<&'a str>,
}

/// File-backed ledger store.
///
/// A file that does not exist yet reads as an empty ledger and is created,
/// header included, on the first save. Saves go through a sibling temporary
/// file and a rename so a failed write leaves the previous ledger in place.
#[derive(Debug, Clone)]
pub struct CsvLedgerStore {
    path: PathBuf,
}

impl CsvLedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> FlowResult<Ledger> {
        if !self.path.exists() {
            log::debug!("{} does not exist yet, starting an empty ledger", self.path.display());
            return Ok(Ledger::new());
        }

        let mut rdr = ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(storage_error)?;

        let mut records = Vec::new();
        for (index, row) in rdr.deserialize::<StoredRow>().enumerate() {
            let row = row.map_err(storage_error)?;
            records.push(decode_row(row).map_err(|e| {
                FlowError::Storage(format!(
                    "{} line {}: {e}",
                    self.path.display(),
                    index + 2
                ))
            })?);
        }

        Ok(Ledger::from_records(records))
    }

    fn write(&self, ledger: &Ledger) -> FlowResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        {
            let mut wrt = WriterBuilder::new()
                .has_headers(false)
                .from_path(&staging)
                .map_err(storage_error)?;
            wrt.write_record(LEDGER_HEADER).map_err(storage_error)?;

            for record in ledger {
                wrt.serialize(StoredRowOut {
                    entity_id: &record.entity_id,
                    entity_name: &record.entity_name,
                    category: &record.category,
                    transaction_type: &record.transaction_type,
                    direction: record.direction.as_str(),
                    amount: record.amount.to_string(),
                    occurred_on: record.occurred_on.format("%Y-%m-%d").to_string(),
                    is_forecast: record.is_forecast,
                    notes: record.notes.as_deref(),
                })
                .map_err(storage_error)?;
            }
            wrt.flush()?;
        }

        std::fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

fn storage_error(err: csv::Error) -> FlowError {
    match FlowError::from(err) {
        FlowError::Parse(message) => FlowError::Storage(message),
        other => other,
    }
}

fn decode_row(row: StoredRow) -> Result<CanonicalRecord, String> {
    let direction = Direction::parse(&row.direction)
        .ok_or_else(|| format!("unknown direction '{}'", row.direction))?;
    let amount = BigDecimal::from_str(&row.amount)
        .map_err(|e| format!("amount '{}': {e}", row.amount))?;
    let occurred_on = NaiveDate::parse_from_str(&row.occurred_on, "%Y-%m-%d")
        .map_err(|e| format!("occurred_on '{}': {e}", row.occurred_on))?;
    let is_forecast = match row.is_forecast.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => true,
        "false" | "0" | "no" | "" => false,
        other => return Err(format!("is_forecast '{other}' is not a boolean")),
    };

    let record = CanonicalRecord {
        entity_id: row.entity_id,
        entity_name: row.entity_name,
        category: row.category,
        transaction_type: row.transaction_type,
        direction,
        amount,
        occurred_on,
        is_forecast,
        notes: row.notes.filter(|n| !n.is_empty()),
    };
    record.validate().map_err(|e| e.to_string())?;
    Ok(record)
}

#[async_trait]
impl LedgerStorage for CsvLedgerStore {
    async fn load_ledger(&self) -> FlowResult<Ledger> {
        self.read()
    }

    async fn save_ledger(&mut self, ledger: &Ledger) -> FlowResult<()> {
        self.write(ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn ledger() -> Ledger {
        let actual = CanonicalRecord {
            transaction_type: "Sub/Trans".to_string(),
            notes: Some("wire, received late".to_string()),
            ..CanonicalRecord::actual(
                "INV001".to_string(),
                "Alpha Pension".to_string(),
                "Feeder A".to_string(),
                Direction::Inflow,
                BigDecimal::from_str("500000.25").unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            )
        };
        let forecast = CanonicalRecord::forecast(
            "INV002".to_string(),
            "Beta Family Office".to_string(),
            "Feeder B".to_string(),
            Direction::Outflow,
            BigDecimal::from(75000),
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        );
        Ledger::from_records(vec![forecast, actual])
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_ledger() {
        let dir = tempdir().unwrap();
        let store = CsvLedgerStore::new(dir.path().join("tracker.csv"));
        assert!(store.load_ledger().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_round_trip() {
        let dir = tempdir().unwrap();
        let mut store = CsvLedgerStore::new(dir.path().join("nested").join("tracker.csv"));

        let original = ledger();
        store.save_ledger(&original).await.unwrap();
        let loaded = store.load_ledger().await.unwrap();

        assert_eq!(loaded, original);
        assert_eq!(loaded.forecasts().count(), 1);
    }

    #[tokio::test]
    async fn test_empty_ledger_writes_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tracker.csv");
        let mut store = CsvLedgerStore::new(&path);

        store.save_ledger(&Ledger::new()).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.trim_end(), LEDGER_HEADER.join(","));
        assert!(store.load_ledger().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_row_is_storage_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tracker.csv");
        std::fs::write(
            &path,
            format!(
                "{}\nINV001,Alpha,Feeder A,Subscription,sideways,100,2024-03-01,false,\n",
                LEDGER_HEADER.join(",")
            ),
        )
        .unwrap();

        let err = CsvLedgerStore::new(&path).load_ledger().await.unwrap_err();
        assert_eq!(err.kind(), FlowErrorKind::Storage);
        assert!(err.to_string().contains("line 2"));
    }
}
