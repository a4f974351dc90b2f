//! Mock customer store.

use crate::error::{AccountsError, Result};
use crate::providers::CustomerStore;
use crate::state::{Customer, CustomerId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory customer store.
#[derive(Debug, Clone, Default)]
pub struct MockCustomerStore {
    rows: Arc<Mutex<HashMap<CustomerId, Customer>>>,
}

impl MockCustomerStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a customer directly (test setup only).
    pub fn seed(&self, customer: Customer) {
        if let Ok(mut rows) = self.lock() {
            rows.insert(customer.id, customer);
        }
    }

    /// Number of stored customers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().map(|rows| rows.len()).unwrap_or(0)
    }

    /// `true` when no customer is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<CustomerId, Customer>>> {
        self.rows
            .lock()
            .map_err(|_| AccountsError::Internal("customer lock poisoned".to_string()))
    }
}

impl CustomerStore for MockCustomerStore {
    async fn insert(&self, customer: &Customer) -> Result<()> {
        self.lock()?.insert(customer.id, customer.clone());
        Ok(())
    }

    async fn find(&self, customer_id: CustomerId) -> Result<Option<Customer>> {
        Ok(self.lock()?.get(&customer_id).cloned())
    }

    async fn exists(&self, customer_id: CustomerId) -> Result<bool> {
        Ok(self.lock()?.contains_key(&customer_id))
    }

    async fn update(&self, customer: &Customer) -> Result<()> {
        let mut rows = self.lock()?;
        if !rows.contains_key(&customer.id) {
            return Err(AccountsError::CustomerNotFound);
        }
        rows.insert(customer.id, customer.clone());
        Ok(())
    }
}
