//! Deterministic fakes of the external capabilities.
//!
//! Each fake honors the at-most-once-per-key contract (a repeated
//! idempotency key returns the original id without a second effect),
//! records every attempt, and can script failures to exercise the
//! saga's resume paths.

use crate::error::{IdentityError, Result};
use crate::providers::{AccountsClient, CustomerProfile, CustomersClient, LedgerClient};
use banca_core::Currency;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct CapabilityInner {
    /// Effect id per idempotency key.
    effects: HashMap<String, String>,
    /// Idempotency key of every attempt, failures included.
    attempts: Vec<String>,
    failures_remaining: u32,
    next_id: u64,
}

#[derive(Debug, Clone)]
struct Capability {
    name: &'static str,
    prefix: &'static str,
    inner: Arc<Mutex<CapabilityInner>>,
}

impl Capability {
    fn new(name: &'static str, prefix: &'static str) -> Self {
        Self {
            name,
            prefix,
            inner: Arc::new(Mutex::new(CapabilityInner::default())),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, CapabilityInner>> {
        self.inner
            .lock()
            .map_err(|_| IdentityError::Internal(format!("{} lock poisoned", self.name)))
    }

    fn invoke(&self, idempotency_key: &str) -> Result<String> {
        let mut inner = self.lock()?;
        inner.attempts.push(idempotency_key.to_string());

        if inner.failures_remaining > 0 {
            inner.failures_remaining -= 1;
            return Err(IdentityError::ExternalService(format!(
                "{} unavailable (scripted)",
                self.name
            )));
        }

        if let Some(existing) = inner.effects.get(idempotency_key) {
            return Ok(existing.clone());
        }

        inner.next_id += 1;
        let id = format!("{}-{}", self.prefix, inner.next_id);
        inner.effects.insert(idempotency_key.to_string(), id.clone());
        Ok(id)
    }

    fn fail_next(&self, n: u32) {
        if let Ok(mut inner) = self.lock() {
            inner.failures_remaining = n;
        }
    }

    fn effect_count(&self) -> usize {
        self.lock().map(|inner| inner.effects.len()).unwrap_or(0)
    }

    fn attempts(&self) -> Vec<String> {
        self.lock()
            .map(|inner| inner.attempts.clone())
            .unwrap_or_default()
    }
}

/// Customer-creation fake issuing `CUS-n` ids.
#[derive(Debug, Clone)]
pub struct MockCustomersClient {
    capability: Capability,
}

impl Default for MockCustomersClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCustomersClient {
    /// Create a fake that always succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self {
            capability: Capability::new("customers", "CUS"),
        }
    }

    /// Fail the next `n` calls.
    pub fn fail_next(&self, n: u32) {
        self.capability.fail_next(n);
    }

    /// Customers actually created (unique keys).
    #[must_use]
    pub fn created_count(&self) -> usize {
        self.capability.effect_count()
    }

    /// Idempotency key of every attempt, in order.
    #[must_use]
    pub fn attempts(&self) -> Vec<String> {
        self.capability.attempts()
    }
}

impl CustomersClient for MockCustomersClient {
    async fn create_customer(
        &self,
        idempotency_key: &str,
        _external_ref: &str,
        _profile: &CustomerProfile,
    ) -> Result<String> {
        self.capability.invoke(idempotency_key)
    }
}

/// Account-creation fake issuing `ACC-n` ids.
#[derive(Debug, Clone)]
pub struct MockAccountsClient {
    capability: Capability,
}

impl Default for MockAccountsClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAccountsClient {
    /// Create a fake that always succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self {
            capability: Capability::new("accounts", "ACC"),
        }
    }

    /// Fail the next `n` calls.
    pub fn fail_next(&self, n: u32) {
        self.capability.fail_next(n);
    }

    /// Accounts actually created (unique keys).
    #[must_use]
    pub fn created_count(&self) -> usize {
        self.capability.effect_count()
    }

    /// Idempotency key of every attempt, in order.
    #[must_use]
    pub fn attempts(&self) -> Vec<String> {
        self.capability.attempts()
    }
}

impl AccountsClient for MockAccountsClient {
    async fn create_account(
        &self,
        idempotency_key: &str,
        _external_ref: &str,
        _customer_id: &str,
        _product_type: &str,
        _currency: &Currency,
    ) -> Result<String> {
        self.capability.invoke(idempotency_key)
    }
}

/// Ledger-credit fake issuing `JRN-n` journal ids.
#[derive(Debug, Clone)]
pub struct MockLedgerClient {
    capability: Capability,
}

impl Default for MockLedgerClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLedgerClient {
    /// Create a fake that always succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self {
            capability: Capability::new("ledger", "JRN"),
        }
    }

    /// Fail the next `n` calls.
    pub fn fail_next(&self, n: u32) {
        self.capability.fail_next(n);
    }

    /// Postings actually made (unique keys).
    #[must_use]
    pub fn posting_count(&self) -> usize {
        self.capability.effect_count()
    }

    /// Idempotency key of every attempt, in order.
    #[must_use]
    pub fn attempts(&self) -> Vec<String> {
        self.capability.attempts()
    }
}

impl LedgerClient for MockLedgerClient {
    async fn credit_account(
        &self,
        idempotency_key: &str,
        _account_id: &str,
        _currency: &Currency,
        _amount: Decimal,
        _initiated_by: &str,
        _external_ref: &str,
        _reason: &str,
        _customer_id: &str,
    ) -> Result<String> {
        self.capability.invoke(idempotency_key)
    }
}
