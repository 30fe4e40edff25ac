//! Existence checks for incoming records against a ledger

use std::collections::HashSet;

use crate::types::*;

/// Candidates split into records the ledger has not seen and records it already holds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DedupOutcome {
    pub fresh: Vec<CanonicalRecord>,
    pub duplicates: Vec<CanonicalRecord>,
}

/// Exact-match deduplication on [`MatchKey`] against the ledger's actual records
pub struct Deduplicator;

impl Deduplicator {
    /// Keys of every actual record in the ledger. Forecasts never count as existing.
    pub fn existing_keys(ledger: &Ledger) -> HashSet<MatchKey> {
        ledger.actuals().map(CanonicalRecord::match_key).collect()
    }

    /// Whether a candidate's key is among `existing`
    pub fn is_duplicate(existing: &HashSet<MatchKey>, record: &CanonicalRecord) -> bool {
        existing.contains(&record.match_key())
    }

    /// Split candidates by whether their key is already present, preserving order
    pub fn partition(candidates: Vec<CanonicalRecord>, ledger: &Ledger) -> DedupOutcome {
        let existing = Self::existing_keys(ledger);
        let (duplicates, fresh): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|record| Self::is_duplicate(&existing, record));

        DedupOutcome { fresh, duplicates }
    }

    /// Candidates whose key is absent from the ledger
    pub fn filter_new(candidates: Vec<CanonicalRecord>, ledger: &Ledger) -> Vec<CanonicalRecord> {
        Self::partition(candidates, ledger).fresh
    }
}
