//! Message transport trait for the asynchronous ledger-event path.

use crate::error::Result;
use std::future::Future;

/// One raw message fetched from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportMessage {
    /// Opaque handle used to acknowledge this delivery.
    pub receipt: String,
    /// Raw message body (JSON envelope).
    pub body: String,
}

/// At-least-once message transport.
///
/// The transport redelivers any message that is not acknowledged, so
/// the consumer must acknowledge only after the corresponding inbox
/// entry is durably `processed`.
pub trait EventTransport: Send + Sync {
    /// Fetch up to `max` messages. May return fewer, including none.
    ///
    /// # Errors
    ///
    /// Returns
    /// [`Transport`](crate::error::AccountsError::Transport) when the
    /// transport is unreachable.
    fn receive(
        &self,
        max: usize,
    ) -> impl Future<Output = Result<Vec<TransportMessage>>> + Send;

    /// Acknowledge (delete) a delivery so it is never redelivered.
    ///
    /// # Errors
    ///
    /// Returns
    /// [`Transport`](crate::error::AccountsError::Transport) when the
    /// transport is unreachable.
    fn ack(&self, receipt: &str) -> impl Future<Output = Result<()>> + Send;
}
