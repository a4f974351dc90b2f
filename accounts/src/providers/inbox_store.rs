//! Event inbox store trait.

use crate::error::Result;
use crate::state::InboxEvent;
use std::future::Future;

/// Deduplicates inbound asynchronous messages by external event id.
///
/// Processing discipline for each inbound message: `try_begin` → apply
/// every posting → `mark_processed` → acknowledge the transport
/// message. Any failure in between must leave the message
/// un-acknowledged for transport-level redelivery; the inbox row stays
/// non-`processed`, so the retry is re-admitted.
pub trait InboxStore: Send + Sync {
    /// Admit an event for processing.
    ///
    /// Inserts a `received` row on first sight. If a row already
    /// exists, returns `true` only when its status is not `processed`,
    /// so a message stuck mid-processing after a crash can be retried
    /// but a completed one cannot be reapplied.
    ///
    /// A blank `event_id` returns `true` without recording anything:
    /// no dedup is possible, the message is processed anyway
    /// (documented risk, not an error).
    ///
    /// # Errors
    ///
    /// Returns error on storage failure.
    fn try_begin(
        &self,
        event_id: &str,
        event_type: &str,
    ) -> impl Future<Output = Result<bool>> + Send;

    /// Mark an event `processed`. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns error on storage failure.
    fn mark_processed(
        &self,
        event_id: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Record a processing failure. Never fails the caller: a
    /// secondary failure while recording the failure must not mask the
    /// original error. Unknown and blank ids are tolerated.
    fn mark_failed_safe(
        &self,
        event_id: &str,
        event_type: &str,
        error: &str,
    ) -> impl Future<Output = ()> + Send;

    /// Read the inbox row for an event id.
    ///
    /// # Errors
    ///
    /// Returns error on storage failure.
    fn find(
        &self,
        event_id: &str,
    ) -> impl Future<Output = Result<Option<InboxEvent>>> + Send;
}
