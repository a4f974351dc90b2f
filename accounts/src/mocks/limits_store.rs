//! Mock account limits store.

use crate::error::{AccountsError, Result};
use crate::providers::LimitsStore;
use crate::state::{AccountId, AccountLimits};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory limits store.
#[derive(Debug, Clone, Default)]
pub struct MockLimitsStore {
    rows: Arc<Mutex<HashMap<AccountId, AccountLimits>>>,
}

impl MockLimitsStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<AccountId, AccountLimits>>> {
        self.rows
            .lock()
            .map_err(|_| AccountsError::Internal("limits lock poisoned".to_string()))
    }
}

impl LimitsStore for MockLimitsStore {
    async fn find(&self, account_id: AccountId) -> Result<Option<AccountLimits>> {
        Ok(self.lock()?.get(&account_id).cloned())
    }

    async fn patch(
        &self,
        account_id: AccountId,
        daily_out: Option<Decimal>,
        daily_in: Option<Decimal>,
    ) -> Result<AccountLimits> {
        let mut rows = self.lock()?;
        let row = rows.entry(account_id).or_insert(AccountLimits {
            account_id,
            daily_out: Decimal::ZERO,
            daily_in: Decimal::ZERO,
        });
        if let Some(out) = daily_out {
            row.daily_out = out;
        }
        if let Some(inn) = daily_in {
            row.daily_in = inn;
        }
        Ok(row.clone())
    }
}
