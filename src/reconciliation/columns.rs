//! Header resolution: maps a report's own column names onto canonical fields

use std::collections::{BTreeMap, HashMap};

use crate::config::ReconciliationConfig;
use crate::types::*;

/// Canonical field -> raw header found in one specific report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    columns: BTreeMap<CanonicalField, String>,
}

impl ColumnMapping {
    pub fn header_for(&self, field: CanonicalField) -> Option<&str> {
        self.columns.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, &str)> {
        self.columns.iter().map(|(field, header)| (*field, header.as_str()))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Caller-supplied headers that take precedence over the alias table
pub type ColumnOverrides = HashMap<CanonicalField, String>;

/// Lower-case and drop whitespace and punctuation
pub fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Resolves headers through an immutable alias table
#[derive(Debug, Clone)]
pub struct ColumnMatcher {
    aliases: BTreeMap<CanonicalField, Vec<String>>,
}

impl ColumnMatcher {
    pub fn new(config: &ReconciliationConfig) -> Self {
        let aliases = config
            .column_aliases
            .iter()
            .map(|(field, aliases)| {
                let normalized = aliases
                    .iter()
                    .map(|a| normalize_header(a))
                    .filter(|a| !a.is_empty())
                    .collect();
                (*field, normalized)
            })
            .collect();
        Self { aliases }
    }

    /// Find the raw header for one field.
    ///
    /// Aliases are tried in configured order. An alias matching exactly one
    /// header wins; an alias matching several headers is ambiguous and skipped.
    pub fn resolve<S: AsRef<str>>(&self, raw_headers: &[S], field: CanonicalField) -> Option<String> {
        let aliases = self.aliases.get(&field)?;

        let normalized: Vec<(String, &str)> = raw_headers
            .iter()
            .map(|h| (normalize_header(h.as_ref()), h.as_ref()))
            .collect();

        for alias in aliases {
            let mut hits = normalized
                .iter()
                .filter(|(norm, _)| norm == alias)
                .map(|(_, raw)| *raw);

            match (hits.next(), hits.next()) {
                (Some(raw), None) => return Some(raw.to_string()),
                (Some(_), Some(_)) => {
                    log::debug!("alias '{alias}' for {field} matches several headers, skipping");
                }
                _ => {}
            }
        }

        None
    }

    /// Resolve every canonical field, failing with all unresolved required fields at once
    pub fn resolve_all<S: AsRef<str>>(
        &self,
        raw_headers: &[S],
        overrides: &ColumnOverrides,
    ) -> FlowResult<ColumnMapping> {
        let mut mapping = ColumnMapping::default();
        let mut missing = Vec::new();

        for field in CanonicalField::REQUIRED.into_iter().chain(CanonicalField::OPTIONAL) {
            let resolved = match overrides.get(&field) {
                Some(header) => raw_headers
                    .iter()
                    .find(|h| h.as_ref() == header)
                    .map(|h| h.as_ref().to_string()),
                None => self.resolve(raw_headers, field),
            };

            match resolved {
                Some(header) => {
                    mapping.columns.insert(field, header);
                }
                None if field.is_required() => missing.push(field),
                None => {}
            }
        }

        if missing.is_empty() {
            Ok(mapping)
        } else {
            Err(FlowError::MissingColumns(missing))
        }
    }
}
