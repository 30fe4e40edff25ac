//! Record construction helpers

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::*;

/// A manually entered forecast before classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub entity_id: String,
    pub entity_name: String,
    pub category: String,
    /// Free-text type, classified with the same keywords as admin reports
    pub transaction_type: String,
    pub amount: BigDecimal,
    pub occurred_on: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Builder for creating records
#[derive(Debug)]
pub struct RecordBuilder {
    record: CanonicalRecord,
}

impl RecordBuilder {
    /// Create a new record builder for an actual record
    pub fn new(
        entity_id: impl Into<String>,
        occurred_on: NaiveDate,
        direction: Direction,
        amount: BigDecimal,
    ) -> Self {
        Self {
            record: CanonicalRecord::actual(
                entity_id.into(),
                String::new(),
                String::new(),
                direction,
                amount,
                occurred_on,
            ),
        }
    }

    /// Set the investor display name
    pub fn entity_name(mut self, name: impl Into<String>) -> Self {
        self.record.entity_name = name.into();
        self
    }

    /// Set the fund type
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.record.category = category.into();
        self
    }

    /// Keep the raw transaction-type term
    pub fn transaction_type(mut self, raw_type: impl Into<String>) -> Self {
        self.record.transaction_type = raw_type.into();
        self
    }

    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.record.notes = notes.filter(|n| !n.trim().is_empty());
        self
    }

    /// Mark the record as a forecast
    pub fn forecast(mut self) -> Self {
        self.record.is_forecast = true;
        self
    }

    /// Build the record
    pub fn build(self) -> FlowResult<CanonicalRecord> {
        self.record.validate()?;
        Ok(self.record)
    }
}

/// Common record patterns
pub mod patterns {
    use super::*;

    /// Confirmed subscription (inflow)
    pub fn subscription(
        entity_id: &str,
        entity_name: &str,
        category: &str,
        amount: BigDecimal,
        occurred_on: NaiveDate,
    ) -> FlowResult<CanonicalRecord> {
        RecordBuilder::new(entity_id, occurred_on, Direction::Inflow, amount)
            .entity_name(entity_name)
            .category(category)
            .transaction_type("Subscription")
            .build()
    }

    /// Confirmed redemption (outflow)
    pub fn redemption(
        entity_id: &str,
        entity_name: &str,
        category: &str,
        amount: BigDecimal,
        occurred_on: NaiveDate,
    ) -> FlowResult<CanonicalRecord> {
        RecordBuilder::new(entity_id, occurred_on, Direction::Outflow, amount)
            .entity_name(entity_name)
            .category(category)
            .transaction_type("Redemption")
            .build()
    }

    /// Expected subscription that has not been confirmed by the administrator
    pub fn forecast_subscription(
        entity_id: &str,
        entity_name: &str,
        category: &str,
        amount: BigDecimal,
        occurred_on: NaiveDate,
    ) -> FlowResult<CanonicalRecord> {
        RecordBuilder::new(entity_id, occurred_on, Direction::Inflow, amount)
            .entity_name(entity_name)
            .category(category)
            .transaction_type("Subscription")
            .forecast()
            .build()
    }

    /// Expected redemption that has not been confirmed by the administrator
    pub fn forecast_redemption(
        entity_id: &str,
        entity_name: &str,
        category: &str,
        amount: BigDecimal,
        occurred_on: NaiveDate,
    ) -> FlowResult<CanonicalRecord> {
        RecordBuilder::new(entity_id, occurred_on, Direction::Outflow, amount)
            .entity_name(entity_name)
            .category(category)
            .transaction_type("Redemption")
            .forecast()
            .build()
    }
}
