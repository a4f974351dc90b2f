//! Ledger-credit capability trait.

use crate::error::Result;
use crate::state::{AccountId, CustomerId, JournalId};
use banca_core::Currency;
use rust_decimal::Decimal;
use std::future::Future;

/// One credit request to the external ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct CreditRequest {
    /// Idempotency key for the posting; the ledger guarantees
    /// at-most-once per key.
    pub idempotency_key: String,
    /// Account to credit.
    pub account_id: AccountId,
    /// Posting currency.
    pub currency: Currency,
    /// Posting amount.
    pub amount: Decimal,
    /// Actor recorded on the journal entry.
    pub initiated_by: String,
    /// External reference recorded on the journal entry.
    pub external_ref: String,
    /// Business reason recorded on the journal entry.
    pub reason: String,
    /// Customer on whose behalf the credit is made.
    pub customer_id: CustomerId,
}

/// The external ledger-credit capability.
///
/// Guarantees at-most-once posting per idempotency key, which is what
/// makes a re-entered saga step safe: a retried call with the same key
/// cannot cause a double posting.
pub trait LedgerClient: Send + Sync {
    /// Request a credit; returns the journal id of the posting (new or
    /// pre-existing for a repeated key).
    ///
    /// # Errors
    ///
    /// Returns
    /// [`ExternalService`](crate::error::AccountsError::ExternalService)
    /// when the capability is unreachable or rejects the request.
    fn credit_account(
        &self,
        request: CreditRequest,
    ) -> impl Future<Output = Result<JournalId>> + Send;
}
