//! Mock balance store.

use crate::error::{AccountsError, Result};
use crate::providers::BalanceStore;
use crate::state::{AccountId, Balance, Posting};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory balance store.
///
/// Each operation runs inside one critical section, standing in for the
/// storage engine's row-level serialization of the production store's
/// single-statement conditional updates.
#[derive(Debug, Clone, Default)]
pub struct MockBalanceStore {
    rows: Arc<Mutex<HashMap<AccountId, Balance>>>,
}

impl MockBalanceStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a balance row directly (test setup only).
    pub fn seed(&self, balance: Balance) {
        self.lock_unpoisoned().insert(balance.account_id, balance);
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<AccountId, Balance>>> {
        self.rows
            .lock()
            .map_err(|_| AccountsError::Internal("balance lock poisoned".to_string()))
    }

    fn lock_unpoisoned(&self) -> MutexGuard<'_, HashMap<AccountId, Balance>> {
        match self.rows.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl BalanceStore for MockBalanceStore {
    async fn init_zero(&self, account_id: AccountId) -> Result<()> {
        let mut rows = self.lock()?;
        if rows.contains_key(&account_id) {
            return Err(AccountsError::AlreadyExists {
                what: "balance row",
            });
        }
        rows.insert(account_id, Balance::zero(account_id));
        Ok(())
    }

    async fn find(&self, account_id: AccountId) -> Result<Option<Balance>> {
        Ok(self.lock()?.get(&account_id).cloned())
    }

    async fn reserve_hold(
        &self,
        account_id: AccountId,
        amount: Decimal,
    ) -> Result<Decimal> {
        let mut rows = self.lock()?;
        let row = rows
            .get_mut(&account_id)
            .ok_or(AccountsError::BalanceNotFound(account_id))?;
        if row.available < amount {
            return Err(AccountsError::InsufficientFunds { account_id });
        }
        row.available -= amount;
        row.hold += amount;
        Ok(row.hold)
    }

    async fn release_hold(
        &self,
        account_id: AccountId,
        amount: Decimal,
    ) -> Result<Decimal> {
        let mut rows = self.lock()?;
        let row = rows
            .get_mut(&account_id)
            .ok_or(AccountsError::BalanceNotFound(account_id))?;
        if row.hold < amount {
            return Err(AccountsError::InvalidHoldState { account_id });
        }
        row.hold -= amount;
        row.available += amount;
        Ok(row.hold)
    }

    async fn apply_deltas(
        &self,
        account_id: AccountId,
        d_ledger: Decimal,
        d_available: Decimal,
        d_hold: Decimal,
    ) -> Result<()> {
        let mut rows = self.lock()?;
        let row = rows
            .get_mut(&account_id)
            .ok_or(AccountsError::BalanceNotFound(account_id))?;
        row.ledger += d_ledger;
        row.available += d_available;
        row.hold += d_hold;
        Ok(())
    }

    async fn apply_postings(&self, postings: &[Posting]) -> Result<()> {
        let mut rows = self.lock()?;
        // All-or-nothing: verify every row exists before touching any.
        for posting in postings {
            if !rows.contains_key(&posting.account_id) {
                return Err(AccountsError::BalanceNotFound(posting.account_id));
            }
        }
        for posting in postings {
            if let Some(row) = rows.get_mut(&posting.account_id) {
                row.ledger += posting.d_ledger;
                row.available += posting.d_available;
                row.hold += posting.d_hold;
            }
        }
        Ok(())
    }
}
