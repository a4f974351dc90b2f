//! Mock message transport.

use crate::error::{AccountsError, Result};
use crate::providers::{EventTransport, TransportMessage};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct TransportInner {
    queue: Vec<TransportMessage>,
    next_receipt: u64,
}

/// In-memory at-least-once transport.
///
/// Messages stay in the queue until acknowledged, so every `receive`
/// redelivers anything not yet acked, the same discipline a real queue
/// applies after a visibility timeout.
#[derive(Debug, Clone, Default)]
pub struct MockEventTransport {
    inner: Arc<Mutex<TransportInner>>,
}

impl MockEventTransport {
    /// Create an empty transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a raw message body; returns its receipt handle.
    pub fn push(&self, body: impl Into<String>) -> String {
        let mut inner = self.lock_unpoisoned();
        inner.next_receipt += 1;
        let receipt = format!("rcpt-{}", inner.next_receipt);
        inner.queue.push(TransportMessage {
            receipt: receipt.clone(),
            body: body.into(),
        });
        receipt
    }

    /// Number of messages still un-acknowledged.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.lock_unpoisoned().queue.len()
    }

    fn lock(&self) -> Result<MutexGuard<'_, TransportInner>> {
        self.inner
            .lock()
            .map_err(|_| AccountsError::Internal("transport lock poisoned".to_string()))
    }

    fn lock_unpoisoned(&self) -> MutexGuard<'_, TransportInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl EventTransport for MockEventTransport {
    async fn receive(&self, max: usize) -> Result<Vec<TransportMessage>> {
        Ok(self.lock()?.queue.iter().take(max).cloned().collect())
    }

    async fn ack(&self, receipt: &str) -> Result<()> {
        self.lock()?.queue.retain(|m| m.receipt != receipt);
        Ok(())
    }
}
