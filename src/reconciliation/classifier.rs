//! Transaction-type classification into inflow / outflow

use crate::config::ReconciliationConfig;
use crate::types::*;

/// Keyword-based classifier. Inflow keywords are checked first and win ties.
#[derive(Debug, Clone)]
pub struct TransactionClassifier {
    inflow_keywords: Vec<String>,
    outflow_keywords: Vec<String>,
}

impl TransactionClassifier {
    pub fn new(config: &ReconciliationConfig) -> Self {
        Self::from_keywords(&config.inflow_keywords, &config.outflow_keywords)
    }

    pub fn from_keywords<S: AsRef<str>>(inflow: &[S], outflow: &[S]) -> Self {
        Self {
            inflow_keywords: prepare(inflow),
            outflow_keywords: prepare(outflow),
        }
    }

    /// Direction for a free-text transaction type, `None` when no keyword matches
    pub fn classify(&self, raw_type: &str) -> Option<Direction> {
        let lowered = raw_type.trim().to_lowercase();
        if lowered.is_empty() {
            return None;
        }

        if self.inflow_keywords.iter().any(|k| lowered.contains(k.as_str())) {
            Some(Direction::Inflow)
        } else if self.outflow_keywords.iter().any(|k| lowered.contains(k.as_str())) {
            Some(Direction::Outflow)
        } else {
            None
        }
    }
}

fn prepare<S: AsRef<str>>(keywords: &[S]) -> Vec<String> {
    keywords
        .iter()
        .map(|k| k.as_ref().trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> TransactionClassifier {
        TransactionClassifier::new(&ReconciliationConfig::default())
    }

    #[test]
    fn test_default_terms() {
        let c = classifier();
        assert_eq!(c.classify("Subscription"), Some(Direction::Inflow));
        assert_eq!(c.classify("Additional Subscription"), Some(Direction::Inflow));
        assert_eq!(c.classify("CAPITAL CALL #3"), Some(Direction::Inflow));
        assert_eq!(c.classify("Redemption"), Some(Direction::Outflow));
        assert_eq!(c.classify("Partial redemption - fees"), Some(Direction::Outflow));
        assert_eq!(c.classify("Transfer Out"), Some(Direction::Outflow));
    }

    #[test]
    fn test_unknown_and_blank_terms() {
        let c = classifier();
        assert_eq!(c.classify("Unusual Rebalance"), None);
        assert_eq!(c.classify(""), None);
        assert_eq!(c.classify("   "), None);
    }

    #[test]
    fn test_inflow_wins_when_both_match() {
        let c = TransactionClassifier::from_keywords(&["switch"], &["switch out"]);
        assert_eq!(c.classify("Switch Out"), Some(Direction::Inflow));

        let c = classifier();
        // "transfer in" and "transfer out" both appear
        assert_eq!(c.classify("transfer in / transfer out"), Some(Direction::Inflow));
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let c = TransactionClassifier::from_keywords(&["  Seed Capital "], &["Payout"]);
        assert_eq!(c.classify("seed capital"), Some(Direction::Inflow));
        assert_eq!(c.classify("PAYOUT"), Some(Direction::Outflow));
    }
}
