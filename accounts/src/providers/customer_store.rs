//! Customer store trait.

use crate::error::Result;
use crate::state::{Customer, CustomerId};
use std::future::Future;

/// Customer persistence.
pub trait CustomerStore: Send + Sync {
    /// Persist a new customer.
    ///
    /// # Errors
    ///
    /// Returns error on storage failure.
    fn insert(&self, customer: &Customer) -> impl Future<Output = Result<()>> + Send;

    /// Read a customer by id.
    ///
    /// # Errors
    ///
    /// Returns error on storage failure.
    fn find(
        &self,
        customer_id: CustomerId,
    ) -> impl Future<Output = Result<Option<Customer>>> + Send;

    /// Whether a customer exists.
    ///
    /// # Errors
    ///
    /// Returns error on storage failure.
    fn exists(
        &self,
        customer_id: CustomerId,
    ) -> impl Future<Output = Result<bool>> + Send;

    /// Replace an existing customer record.
    ///
    /// # Errors
    ///
    /// Returns
    /// [`CustomerNotFound`](crate::error::AccountsError::CustomerNotFound)
    /// when no such customer exists.
    fn update(&self, customer: &Customer) -> impl Future<Output = Result<()>> + Send;
}
