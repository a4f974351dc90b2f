//! External capability traits: customers, accounts, ledger.
//!
//! Every method takes a caller-supplied idempotency key and each
//! capability guarantees at-most-once effect per key. That, not
//! mutual exclusion, is what makes the activation saga safe to retry
//! while a previous call may still be in flight.

use crate::error::Result;
use banca_core::Currency;
use rust_decimal::Decimal;
use std::future::Future;

/// Profile fields forwarded to customer creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerProfile {
    /// Legal name.
    pub full_name: String,
    /// Date of birth (ISO date string).
    pub birth_date: String,
    /// Tax identification number.
    pub tin: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
}

/// The customer-creation capability.
pub trait CustomersClient: Send + Sync {
    /// Create a customer; at-most-once per `idempotency_key`.
    ///
    /// # Errors
    ///
    /// Returns
    /// [`ExternalService`](crate::error::IdentityError::ExternalService)
    /// when the capability is unreachable or rejects the request.
    fn create_customer(
        &self,
        idempotency_key: &str,
        external_ref: &str,
        profile: &CustomerProfile,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// The account-creation capability.
pub trait AccountsClient: Send + Sync {
    /// Create an account; at-most-once per `idempotency_key`.
    ///
    /// # Errors
    ///
    /// Returns
    /// [`ExternalService`](crate::error::IdentityError::ExternalService)
    /// when the capability is unreachable or rejects the request.
    fn create_account(
        &self,
        idempotency_key: &str,
        external_ref: &str,
        customer_id: &str,
        product_type: &str,
        currency: &Currency,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// The ledger-credit capability.
pub trait LedgerClient: Send + Sync {
    /// Credit an account; at-most-once posting per `idempotency_key`.
    /// Returns the journal id.
    ///
    /// # Errors
    ///
    /// Returns
    /// [`ExternalService`](crate::error::IdentityError::ExternalService)
    /// when the capability is unreachable or rejects the request.
    #[allow(clippy::too_many_arguments)]
    fn credit_account(
        &self,
        idempotency_key: &str,
        account_id: &str,
        currency: &Currency,
        amount: Decimal,
        initiated_by: &str,
        external_ref: &str,
        reason: &str,
        customer_id: &str,
    ) -> impl Future<Output = Result<String>> + Send;
}
