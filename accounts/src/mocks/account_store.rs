//! Mock account store.

use crate::error::{AccountsError, Result};
use crate::providers::AccountStore;
use crate::state::{Account, AccountId, CustomerId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory account store.
#[derive(Debug, Clone, Default)]
pub struct MockAccountStore {
    rows: Arc<Mutex<HashMap<AccountId, Account>>>,
}

impl MockAccountStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().map(|rows| rows.len()).unwrap_or(0)
    }

    /// `true` when no account is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<AccountId, Account>>> {
        self.rows
            .lock()
            .map_err(|_| AccountsError::Internal("account lock poisoned".to_string()))
    }
}

impl AccountStore for MockAccountStore {
    async fn insert(&self, account: &Account) -> Result<()> {
        self.lock()?.insert(account.id, account.clone());
        Ok(())
    }

    async fn find(&self, account_id: AccountId) -> Result<Option<Account>> {
        Ok(self.lock()?.get(&account_id).cloned())
    }

    async fn find_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Account>> {
        let mut accounts: Vec<Account> = self
            .lock()?
            .values()
            .filter(|a| a.customer_id == customer_id)
            .cloned()
            .collect();
        accounts.sort_by_key(|a| a.opened_at);
        Ok(accounts)
    }
}
