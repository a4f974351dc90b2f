//! Mock event inbox store.

use crate::error::Result;
use crate::providers::InboxStore;
use crate::state::{InboxEvent, InboxStatus};
use banca_core::{Claim, ClaimTable, Clock, SystemClock};
use std::sync::Arc;

/// In-memory inbox backed by the shared claim table.
#[derive(Clone)]
pub struct MockInboxStore {
    events: ClaimTable<String, InboxEvent>,
    clock: Arc<dyn Clock>,
}

impl Default for MockInboxStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockInboxStore {
    /// Create an empty inbox on the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty inbox on a caller-supplied clock.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            events: ClaimTable::new(),
            clock,
        }
    }

    /// Number of recorded event ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// `true` when no event id was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl InboxStore for MockInboxStore {
    async fn try_begin(&self, event_id: &str, event_type: &str) -> Result<bool> {
        if event_id.trim().is_empty() {
            // No dedup possible; process anyway.
            return Ok(true);
        }

        let fresh = InboxEvent {
            event_id: event_id.to_string(),
            event_type: event_type.to_string(),
            received_at: self.clock.now(),
            processed_at: None,
            status: InboxStatus::Received,
            error: None,
        };

        match self.events.claim(event_id.to_string(), fresh) {
            Claim::First => Ok(true),
            Claim::Existing(existing) => Ok(existing.status != InboxStatus::Processed),
        }
    }

    async fn mark_processed(&self, event_id: &str) -> Result<()> {
        if event_id.trim().is_empty() {
            return Ok(());
        }
        if let Some(mut event) = self.events.get(&event_id.to_string()) {
            event.status = InboxStatus::Processed;
            event.processed_at = Some(self.clock.now());
            event.error = None;
            self.events.update(&event_id.to_string(), event);
        }
        Ok(())
    }

    async fn mark_failed_safe(&self, event_id: &str, event_type: &str, error: &str) {
        if event_id.trim().is_empty() {
            return;
        }
        let mut event = self.events.get(&event_id.to_string()).unwrap_or(InboxEvent {
            event_id: event_id.to_string(),
            event_type: event_type.to_string(),
            received_at: self.clock.now(),
            processed_at: None,
            status: InboxStatus::Received,
            error: None,
        });
        event.status = InboxStatus::Failed;
        event.error = Some(error.to_string());
        self.events.upsert(event_id.to_string(), event);
    }

    async fn find(&self, event_id: &str) -> Result<Option<InboxEvent>> {
        Ok(self.events.get(&event_id.to_string()))
    }
}
