//! Traits for storage abstraction and extensibility

use async_trait::async_trait;

use crate::types::*;

/// Storage abstraction for the persisted ledger
///
/// The reconciliation core never touches storage itself: a caller loads a
/// ledger snapshot, hands it to the engine, and saves the ledger it gets back.
/// Implementations exist for memory and CSV files; a database table works the
/// same way.
#[async_trait]
pub trait LedgerStorage: Send + Sync {
    /// Load the current ledger snapshot; a store that was never written yields an empty ledger
    async fn load_ledger(&self) -> FlowResult<Ledger>;

    /// Replace the persisted ledger with a new snapshot
    async fn save_ledger(&mut self, ledger: &Ledger) -> FlowResult<()>;
}

/// Trait for implementing custom record validation rules
pub trait RecordValidator: Send + Sync {
    /// Validate a record before it enters the ledger
    fn validate_record(&self, record: &CanonicalRecord) -> FlowResult<()>;
}

/// Default validator enforcing the record invariants only
pub struct DefaultRecordValidator;

impl RecordValidator for DefaultRecordValidator {
    fn validate_record(&self, record: &CanonicalRecord) -> FlowResult<()> {
        record.validate()
    }
}
