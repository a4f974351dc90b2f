//! Opening-bonus grant store trait.

use crate::error::Result;
use crate::state::OpeningBonusGrant;
use banca_core::Claim;
use std::future::Future;

/// Claims a one-time bonus-grant slot per idempotency key.
///
/// `try_insert` is the single serialization point that prevents a bonus
/// from being credited twice when the surrounding orchestration step is
/// retried or raced: among any number of concurrent attempts on one
/// key, exactly one caller gets [`Claim::First`], and only that caller
/// may apply the matching balance credit.
pub trait BonusGrantStore: Send + Sync {
    /// Read the grant under `key`, if one was ever inserted. A blank
    /// key reads as absent.
    ///
    /// # Errors
    ///
    /// Returns error on storage failure.
    fn find_by_key(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<OpeningBonusGrant>>> + Send;

    /// Uniqueness-constrained insert on the grant's key.
    ///
    /// Losers receive the pre-existing grant and must treat the
    /// conflict as success-equivalent.
    ///
    /// # Errors
    ///
    /// Returns error on storage failure, never on a duplicate key.
    fn try_insert(
        &self,
        grant: OpeningBonusGrant,
    ) -> impl Future<Output = Result<Claim<OpeningBonusGrant>>> + Send;
}
