//! Account limits store trait.

use crate::error::Result;
use crate::state::{AccountId, AccountLimits};
use rust_decimal::Decimal;
use std::future::Future;

/// Per-account daily limit rows.
pub trait LimitsStore: Send + Sync {
    /// Read the limits row for an account.
    ///
    /// # Errors
    ///
    /// Returns error on storage failure.
    fn find(
        &self,
        account_id: AccountId,
    ) -> impl Future<Output = Result<Option<AccountLimits>>> + Send;

    /// Upsert the limits row, patching only the provided fields.
    /// Returns the row after the patch.
    ///
    /// # Errors
    ///
    /// Returns error on storage failure.
    fn patch(
        &self,
        account_id: AccountId,
        daily_out: Option<Decimal>,
        daily_in: Option<Decimal>,
    ) -> impl Future<Output = Result<AccountLimits>> + Send;
}
