//! Balance store trait.

use crate::error::Result;
use crate::state::{AccountId, Balance, Posting};
use rust_decimal::Decimal;
use std::future::Future;

/// Per-account balance record with atomic reserve/release/apply-delta
/// operations.
///
/// All correctness under concurrency lives here: `reserve_hold` and
/// `release_hold` are compare-and-swap operations expressed as one
/// atomic write performed by the storage layer, never a read-then-write
/// in application code. Two concurrent calls against the same account
/// are serialized by the storage engine itself.
pub trait BalanceStore: Send + Sync {
    /// Create the zero-valued balance row tied to `account_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AlreadyExists`](crate::error::AccountsError::AlreadyExists)
    /// when called twice for the same account.
    fn init_zero(
        &self,
        account_id: AccountId,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Read the balance row, if the account has one.
    ///
    /// # Errors
    ///
    /// Returns error on storage failure.
    fn find(
        &self,
        account_id: AccountId,
    ) -> impl Future<Output = Result<Option<Balance>>> + Send;

    /// Atomically increment `hold` and decrement `available` by
    /// `amount`, only if `available ≥ amount`. Returns the new hold.
    ///
    /// # Errors
    ///
    /// - [`InsufficientFunds`](crate::error::AccountsError::InsufficientFunds)
    ///   when the conditional update affects zero rows but the row
    ///   exists
    /// - [`BalanceNotFound`](crate::error::AccountsError::BalanceNotFound)
    ///   when the account has no balance row
    fn reserve_hold(
        &self,
        account_id: AccountId,
        amount: Decimal,
    ) -> impl Future<Output = Result<Decimal>> + Send;

    /// Atomically decrement `hold` and increment `available` by
    /// `amount`, only if `hold ≥ amount`. Returns the new hold.
    ///
    /// # Errors
    ///
    /// - [`InvalidHoldState`](crate::error::AccountsError::InvalidHoldState)
    ///   when the release exceeds the outstanding hold
    /// - [`BalanceNotFound`](crate::error::AccountsError::BalanceNotFound)
    ///   when the account has no balance row
    fn release_hold(
        &self,
        account_id: AccountId,
        amount: Decimal,
    ) -> impl Future<Output = Result<Decimal>> + Send;

    /// Unconditional additive update, used only for externally
    /// confirmed postings where the invariant is guaranteed by the
    /// upstream ledger's own accounting and not re-checked here.
    ///
    /// # Errors
    ///
    /// Returns
    /// [`BalanceNotFound`](crate::error::AccountsError::BalanceNotFound)
    /// when the account has no balance row.
    fn apply_deltas(
        &self,
        account_id: AccountId,
        d_ledger: Decimal,
        d_available: Decimal,
        d_hold: Decimal,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Apply every posting of one event, all or nothing.
    ///
    /// On error no posting of the batch remains applied, so a failed
    /// message can be redelivered and reprocessed from scratch.
    ///
    /// # Errors
    ///
    /// Returns
    /// [`BalanceNotFound`](crate::error::AccountsError::BalanceNotFound)
    /// when any referenced account has no balance row.
    fn apply_postings(
        &self,
        postings: &[Posting],
    ) -> impl Future<Output = Result<()>> + Send;
}
