//! Idempotency record store trait.

use crate::error::Result;
use crate::state::IdempotencyRecord;
use std::future::Future;

/// Write-once cache of request outcomes by idempotency key.
pub trait IdempotencyStore: Send + Sync {
    /// Read the record under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns error on storage failure.
    fn find(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<IdempotencyRecord>>> + Send;

    /// Persist a record; first writer wins, later writes for the same
    /// key are silently ignored.
    ///
    /// # Errors
    ///
    /// Returns error on storage failure.
    fn save(
        &self,
        record: IdempotencyRecord,
    ) -> impl Future<Output = Result<()>> + Send;
}
