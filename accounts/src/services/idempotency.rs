//! Request-scoped idempotency guard.

use crate::error::Result;
use crate::providers::IdempotencyStore;
use crate::state::IdempotencyRecord;
use banca_core::{Clock, SystemClock};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Caches the result of a request-scoped operation by a caller-supplied
/// key.
///
/// Discipline for callers: call [`try_get`](Self::try_get) first on
/// every invocation so retries short-circuit before redoing work, and
/// call [`save`](Self::save) only after the side-effecting work
/// completed successfully.
#[derive(Debug, Clone)]
pub struct IdempotencyGuard<S, C = SystemClock> {
    store: S,
    clock: C,
}

impl<S: IdempotencyStore> IdempotencyGuard<S> {
    /// Create a guard on the system clock.
    pub const fn new(store: S) -> Self {
        Self {
            store,
            clock: SystemClock,
        }
    }
}

impl<S: IdempotencyStore, C: Clock> IdempotencyGuard<S, C> {
    /// Create a guard on a caller-supplied clock.
    pub const fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    /// Return the cached response for `key`, only if the stored
    /// operation name matches.
    ///
    /// A blank key always returns `None`: no dedup is possible, which
    /// is a documented risk rather than an error. A cached payload that
    /// no longer decodes as `T` also reads as a miss.
    ///
    /// # Errors
    ///
    /// Returns error on storage failure.
    pub async fn try_get<T: DeserializeOwned>(
        &self,
        key: &str,
        operation: &str,
    ) -> Result<Option<T>> {
        if key.trim().is_empty() {
            return Ok(None);
        }

        let Some(record) = self.store.find(key).await? else {
            return Ok(None);
        };
        if record.operation != operation {
            return Ok(None);
        }

        match serde_json::from_value(record.response) {
            Ok(response) => Ok(Some(response)),
            Err(err) => {
                debug!(key = %key, operation = %operation, error = %err,
                    "cached idempotency payload no longer decodes; treating as miss");
                Ok(None)
            }
        }
    }

    /// Persist the response for `key` once; the first writer wins and
    /// later saves are ignored. A blank key is a no-op.
    ///
    /// # Errors
    ///
    /// Returns error on storage failure or if the response does not
    /// serialize.
    pub async fn save<T: Serialize>(
        &self,
        key: &str,
        operation: &str,
        status_code: u16,
        response: &T,
    ) -> Result<()> {
        if key.trim().is_empty() {
            return Ok(());
        }

        let record = IdempotencyRecord {
            key: key.to_string(),
            operation: operation.to_string(),
            status_code,
            response: serde_json::to_value(response)?,
            created_at: self.clock.now(),
        };
        self.store.save(record).await
    }
}
