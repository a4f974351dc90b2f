//! Registration intent store trait.

use crate::error::Result;
use crate::state::{RegistrationId, RegistrationIntent};
use std::future::Future;

/// Registration intent persistence.
///
/// The activation saga persists each sub-step output through
/// [`update`](Self::update) before invoking the next sub-step; the
/// store must make the write durable before returning.
pub trait RegistrationStore: Send + Sync {
    /// Persist a new intent.
    ///
    /// # Errors
    ///
    /// Returns error on storage failure.
    fn insert(
        &self,
        intent: &RegistrationIntent,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Read an intent by id.
    ///
    /// # Errors
    ///
    /// Returns error on storage failure.
    fn find(
        &self,
        id: RegistrationId,
    ) -> impl Future<Output = Result<Option<RegistrationIntent>>> + Send;

    /// Replace an existing intent row.
    ///
    /// # Errors
    ///
    /// Returns
    /// [`RegistrationNotFound`](crate::error::IdentityError::RegistrationNotFound)
    /// when no such intent exists.
    fn update(
        &self,
        intent: &RegistrationIntent,
    ) -> impl Future<Output = Result<()>> + Send;
}
