//! Account store and account-creation traits.

use crate::error::Result;
use crate::state::{Account, AccountId, CustomerId};
use banca_core::Currency;
use std::future::Future;

/// Account persistence.
pub trait AccountStore: Send + Sync {
    /// Persist a new account.
    ///
    /// # Errors
    ///
    /// Returns error on storage failure.
    fn insert(&self, account: &Account) -> impl Future<Output = Result<()>> + Send;

    /// Read an account by id.
    ///
    /// # Errors
    ///
    /// Returns error on storage failure.
    fn find(
        &self,
        account_id: AccountId,
    ) -> impl Future<Output = Result<Option<Account>>> + Send;

    /// All accounts owned by a customer.
    ///
    /// # Errors
    ///
    /// Returns error on storage failure.
    fn find_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> impl Future<Output = Result<Vec<Account>>> + Send;
}

/// Result of creating an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedAccount {
    /// The new account's id.
    pub account_id: AccountId,
    /// The new account's 12-digit display number.
    pub account_number: String,
}

/// The account-creation capability consumed by the opening saga.
///
/// Expected to be safe to call repeatedly for the same logical request:
/// the saga's safety comes from the bonus grant key, not from this call
/// deduplicating itself. A known ambiguity of the design: a direct
/// call racing a saga-driven one can create a duplicate account for the
/// same customer/product/currency.
pub trait CreateAccount: Send + Sync {
    /// Create an account for `customer_id`.
    ///
    /// # Errors
    ///
    /// Returns
    /// [`CustomerNotFound`](crate::error::AccountsError::CustomerNotFound)
    /// for an unknown customer, or a storage error.
    fn create_account(
        &self,
        customer_id: CustomerId,
        product_type: &str,
        currency: &Currency,
    ) -> impl Future<Output = Result<CreatedAccount>> + Send;
}
