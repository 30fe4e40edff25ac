//! Reconciliation configuration: column aliases, transaction keywords and date formats
//!
//! A configuration is an immutable value handed to the engine at construction.
//! The `with_*` methods return an updated copy instead of mutating in place.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::types::*;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const DEFAULT_INFLOW_KEYWORDS: &[&str] = &[
    "subscription",
    "additional subscription",
    "transfer in",
    "exchange in",
    "related movement in",
    "deposit",
    "contribution",
    "capital call",
];

const DEFAULT_OUTFLOW_KEYWORDS: &[&str] = &[
    "redemption",
    "transfer out",
    "exchange out",
    "withdrawal",
    "distribution",
    "related movement out",
];

const DEFAULT_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d %b %Y",
    "%d-%b-%Y",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

fn default_aliases(field: CanonicalField) -> &'static [&'static str] {
    match field {
        CanonicalField::InvestorId => &["investor_id", "Investor ID", "Unique ID", "unique_id", "ID", "HID"],
        CanonicalField::InvestorName => &["investor_name", "Investor Name", "Investor name", "Name"],
        CanonicalField::FundType => &["fund_type", "Fund Type", "Feeder Fund", "Feeder", "Share Class", "Class"],
        CanonicalField::Amount => &["amount", "Amount", "investment_amount", "Investment Amount"],
        CanonicalField::TransactionDate => &["transaction_date", "Transaction Date", "Dealing Date", "Date"],
        CanonicalField::TransactionType => &["transaction_type", "Transaction Type", "Sub/Trans/Red", "Type"],
        CanonicalField::Notes => &["notes", "Notes", "Comments", "Comment"],
    }
}

fn default_column_aliases() -> BTreeMap<CanonicalField, Vec<String>> {
    CanonicalField::REQUIRED
        .iter()
        .chain(CanonicalField::OPTIONAL.iter())
        .map(|field| {
            let aliases = default_aliases(*field).iter().map(|a| a.to_string()).collect();
            (*field, aliases)
        })
        .collect()
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn default_inflow_keywords() -> Vec<String> {
    to_strings(DEFAULT_INFLOW_KEYWORDS)
}

fn default_outflow_keywords() -> Vec<String> {
    to_strings(DEFAULT_OUTFLOW_KEYWORDS)
}

fn default_date_formats() -> Vec<String> {
    to_strings(DEFAULT_DATE_FORMATS)
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Configuration consumed by the reconciliation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationConfig {
    /// Substrings that mark a transaction type as an inflow
    #[serde(default = "default_inflow_keywords")]
    pub inflow_keywords: Vec<String>,
    /// Substrings that mark a transaction type as an outflow
    #[serde(default = "default_outflow_keywords")]
    pub outflow_keywords: Vec<String>,
    /// `chrono` formats tried in order when a date arrives as text
    #[serde(default = "default_date_formats")]
    pub date_formats: Vec<String>,
    /// Accepted header aliases per canonical field, tried in order
    #[serde(default = "default_column_aliases", with = "alias_table")]
    pub column_aliases: BTreeMap<CanonicalField, Vec<String>>,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            inflow_keywords: default_inflow_keywords(),
            outflow_keywords: default_outflow_keywords(),
            date_formats: default_date_formats(),
            column_aliases: default_column_aliases(),
        }
    }
}

impl ReconciliationConfig {
    /// Parse and validate a TOML configuration. Omitted sections fall back to defaults.
    pub fn from_toml(input: &str) -> FlowResult<Self> {
        let config: ReconciliationConfig =
            toml::from_str(input).map_err(|e| FlowError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> FlowResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Serialize the configuration back to TOML
    pub fn to_toml(&self) -> FlowResult<String> {
        toml::to_string_pretty(self).map_err(|e| FlowError::Config(e.to_string()))
    }

    pub fn validate(&self) -> FlowResult<()> {
        for field in CanonicalField::REQUIRED {
            let has_alias = self
                .column_aliases
                .get(&field)
                .is_some_and(|aliases| aliases.iter().any(|a| !a.trim().is_empty()));
            if !has_alias {
                return Err(FlowError::Config(format!(
                    "no column aliases configured for required field '{field}'"
                )));
            }
        }

        validate_keywords("inflow_keywords", &self.inflow_keywords)?;
        validate_keywords("outflow_keywords", &self.outflow_keywords)?;

        if self.date_formats.iter().all(|f| f.trim().is_empty()) {
            return Err(FlowError::Config(
                "at least one date format is required".to_string(),
            ));
        }

        Ok(())
    }

    /// Aliases configured for a field, empty when none
    pub fn aliases_for(&self, field: CanonicalField) -> &[String] {
        self.column_aliases
            .get(&field)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Copy of this configuration with the aliases of one field replaced
    pub fn with_column_aliases(mut self, field: CanonicalField, aliases: Vec<String>) -> Self {
        self.column_aliases.insert(field, aliases);
        self
    }

    /// Copy of this configuration with one extra alias appended for a field
    pub fn with_extra_alias(mut self, field: CanonicalField, alias: impl Into<String>) -> Self {
        self.column_aliases.entry(field).or_default().push(alias.into());
        self
    }

    pub fn with_inflow_keywords(mut self, keywords: Vec<String>) -> Self {
        self.inflow_keywords = keywords;
        self
    }

    pub fn with_outflow_keywords(mut self, keywords: Vec<String>) -> Self {
        self.outflow_keywords = keywords;
        self
    }

    pub fn with_date_formats(mut self, formats: Vec<String>) -> Self {
        self.date_formats = formats;
        self
    }
}

/// Alias tables are keyed by canonical field name in serialized form
mod alias_table {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    use crate::types::CanonicalField;

    pub fn serialize<S: Serializer>(
        table: &BTreeMap<CanonicalField, Vec<String>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let by_name: BTreeMap<&str, &Vec<String>> =
            table.iter().map(|(field, aliases)| (field.as_str(), aliases)).collect();
        by_name.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<CanonicalField, Vec<String>>, D::Error> {
        let by_name = BTreeMap::<String, Vec<String>>::deserialize(deserializer)?;
        by_name
            .into_iter()
            .map(|(name, aliases)| {
                CanonicalField::from_name(&name)
                    .map(|field| (field, aliases))
                    .ok_or_else(|| D::Error::custom(format!("unknown canonical field '{name}'")))
            })
            .collect()
    }
}

fn validate_keywords(name: &str, keywords: &[String]) -> FlowResult<()> {
    if keywords.is_empty() {
        return Err(FlowError::Config(format!("{name} cannot be empty")));
    }

    // A blank keyword is a substring of every string and would classify everything
    if keywords.iter().any(|k| k.trim().is_empty()) {
        return Err(FlowError::Config(format!(
            "{name} cannot contain blank keywords"
        )));
    }

    Ok(())
}
