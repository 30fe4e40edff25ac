//! In-memory storage implementation for testing

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::traits::*;
use crate::types::*;

/// In-memory storage implementation for testing and development
///
/// Clones share the same underlying ledger.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    ledger: Arc<RwLock<Ledger>>,
    saves: Arc<RwLock<usize>>,
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage pre-populated with a ledger
    pub fn with_ledger(ledger: Ledger) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(ledger)),
            saves: Arc::new(RwLock::new(0)),
        }
    }

    /// Number of completed saves
    pub fn save_count(&self) -> usize {
        self.saves.read().map(|count| *count).unwrap_or_default()
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> FlowResult<()> {
        *self.ledger.write().map_err(poisoned)? = Ledger::new();
        Ok(())
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> FlowError {
    FlowError::Storage("memory storage lock poisoned".to_string())
}

#[async_trait]
impl LedgerStorage for MemoryStorage {
    async fn load_ledger(&self) -> FlowResult<Ledger> {
        Ok(self.ledger.read().map_err(poisoned)?.clone())
    }

    async fn save_ledger(&mut self, ledger: &Ledger) -> FlowResult<()> {
        *self.ledger.write().map_err(poisoned)? = ledger.clone();
        *self.saves.write().map_err(poisoned)? += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    fn record() -> CanonicalRecord {
        CanonicalRecord::actual(
            "INV001".to_string(),
            "Alpha Pension".to_string(),
            "Feeder A".to_string(),
            Direction::Inflow,
            BigDecimal::from(500000),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_new_storage_is_empty() {
        let storage = MemoryStorage::new();
        assert!(storage.load_ledger().await.unwrap().is_empty());
        assert_eq!(storage.save_count(), 0);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let mut storage = MemoryStorage::new();
        let observer = storage.clone();

        let ledger = Ledger::from_records(vec![record()]);
        storage.save_ledger(&ledger).await.unwrap();

        assert_eq!(observer.load_ledger().await.unwrap(), ledger);
        assert_eq!(observer.save_count(), 1);

        observer.clear().unwrap();
        assert!(storage.load_ledger().await.unwrap().is_empty());
    }
}
