//! Mock ledger-credit capability.

use crate::error::{AccountsError, Result};
use crate::providers::{CreditRequest, LedgerClient};
use crate::state::JournalId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct LedgerInner {
    /// Journal id per idempotency key (the at-most-once guarantee).
    journals: HashMap<String, JournalId>,
    /// Every request seen, in order (duplicates included).
    calls: Vec<CreditRequest>,
    /// Remaining scripted failures before requests succeed again.
    failures_remaining: u32,
    next_journal: u64,
}

/// Deterministic ledger fake.
///
/// Issues sequential journal ids (`JRN-1`, `JRN-2`, …) and honors the
/// at-most-once-per-key contract: a repeated idempotency key returns
/// the journal id of the first posting without creating a new one.
/// Failures can be scripted to exercise saga retry paths.
#[derive(Debug, Clone, Default)]
pub struct MockLedgerClient {
    inner: Arc<Mutex<LedgerInner>>,
}

impl MockLedgerClient {
    /// Create a ledger fake that always succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `n` credit requests with an external-service
    /// error, then succeed again.
    pub fn fail_next(&self, n: u32) {
        if let Ok(mut inner) = self.lock() {
            inner.failures_remaining = n;
        }
    }

    /// Number of postings actually created (unique keys).
    #[must_use]
    pub fn posting_count(&self) -> usize {
        self.lock().map(|inner| inner.journals.len()).unwrap_or(0)
    }

    /// Every request seen, including deduplicated ones.
    #[must_use]
    pub fn calls(&self) -> Vec<CreditRequest> {
        self.lock().map(|inner| inner.calls.clone()).unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, LedgerInner>> {
        self.inner
            .lock()
            .map_err(|_| AccountsError::Internal("ledger lock poisoned".to_string()))
    }
}

impl LedgerClient for MockLedgerClient {
    async fn credit_account(&self, request: CreditRequest) -> Result<JournalId> {
        let mut inner = self.lock()?;

        if inner.failures_remaining > 0 {
            inner.failures_remaining -= 1;
            return Err(AccountsError::ExternalService(
                "ledger unavailable (scripted)".to_string(),
            ));
        }

        let key = request.idempotency_key.clone();
        inner.calls.push(request);

        if let Some(existing) = inner.journals.get(&key) {
            return Ok(existing.clone());
        }

        inner.next_journal += 1;
        let journal = JournalId(format!("JRN-{}", inner.next_journal));
        inner.journals.insert(key, journal.clone());
        Ok(journal)
    }
}
