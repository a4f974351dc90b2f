//! Mock idempotency record store.

use crate::error::Result;
use crate::providers::IdempotencyStore;
use crate::state::IdempotencyRecord;
use banca_core::ClaimTable;

/// In-memory idempotency store backed by the shared claim table:
/// the first writer for a key wins, later saves are ignored.
#[derive(Debug, Clone, Default)]
pub struct MockIdempotencyStore {
    records: ClaimTable<String, IdempotencyRecord>,
}

impl MockIdempotencyStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// `true` when no record is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl IdempotencyStore for MockIdempotencyStore {
    async fn find(&self, key: &str) -> Result<Option<IdempotencyRecord>> {
        Ok(self.records.get(&key.to_string()))
    }

    async fn save(&self, record: IdempotencyRecord) -> Result<()> {
        let _ = self.records.claim(record.key.clone(), record);
        Ok(())
    }
}
