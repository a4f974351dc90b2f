//! Ledger-posted event consumer.
//!
//! Polls the message transport for `ledger.journal.posted` events and
//! reconciles balances from externally confirmed postings. Delivery is
//! at-least-once; the inbox makes the *effect* exactly-once.
//!
//! Per message: decode → `try_begin` → apply postings (all or nothing)
//! → `mark_processed` → acknowledge. Any failure before the
//! acknowledgement leaves the message on the transport for redelivery;
//! the inbox row stays non-`processed`, so the retry is re-admitted.

use crate::config::ConsumerConfig;
use crate::error::{AccountsError, Result};
use crate::providers::{BalanceStore, EventTransport, InboxStore, TransportMessage};
use crate::state::{LedgerPostedEvent, Posting};
use serde_json::Value;
use tokio::time::interval;
use tracing::{debug, error, info};

/// Consumes ledger-posted events and applies their balance deltas
/// exactly once.
#[derive(Debug, Clone)]
pub struct LedgerPostedConsumer<T, I, B> {
    transport: T,
    inbox: I,
    balances: B,
    config: ConsumerConfig,
}

impl<T, I, B> LedgerPostedConsumer<T, I, B>
where
    T: EventTransport,
    I: InboxStore,
    B: BalanceStore,
{
    /// Create a consumer.
    pub const fn new(transport: T, inbox: I, balances: B, config: ConsumerConfig) -> Self {
        Self {
            transport,
            inbox,
            balances,
            config,
        }
    }

    /// Poll forever on the configured interval.
    ///
    /// Poll errors are logged and the loop continues; per-message
    /// failures are already contained by [`poll_once`](Self::poll_once).
    pub async fn run(self) {
        let mut ticker = interval(self.config.poll_interval);
        info!(
            batch_size = self.config.batch_size,
            "ledger-posted consumer started"
        );
        loop {
            ticker.tick().await;
            match self.poll_once().await {
                Ok(0) => {}
                Ok(n) => debug!(processed = n, "poll applied events"),
                Err(err) => error!(error = %err, "poll failed"),
            }
        }
    }

    /// Fetch one batch and process each message independently.
    ///
    /// Returns the number of messages whose postings were applied.
    /// A failing message is recorded in the inbox and left
    /// un-acknowledged for redelivery; the rest of the batch still
    /// runs.
    ///
    /// # Errors
    ///
    /// Returns error only when the transport fetch itself fails.
    pub async fn poll_once(&self) -> Result<usize> {
        let messages = self.transport.receive(self.config.batch_size).await?;
        let mut applied = 0;

        for message in messages {
            match self.process(&message).await {
                Ok(true) => applied += 1,
                Ok(false) => {}
                Err(err) => {
                    // Recording the failure must never mask the error
                    // itself; mark_failed_safe cannot fail the caller.
                    let event_id = extract_event_id_safe(&message.body).unwrap_or_default();
                    self.inbox
                        .mark_failed_safe(&event_id, &self.config.event_type, &err.to_string())
                        .await;
                    error!(event_id = %event_id, error = %err, "event processing failed; left for redelivery");
                }
            }
        }

        Ok(applied)
    }

    /// Process a single delivery. Returns `true` when postings were
    /// applied, `false` for an acknowledged duplicate.
    async fn process(&self, message: &TransportMessage) -> Result<bool> {
        let event = decode_event(&message.body)?;
        let event_id = event.event_id.clone().unwrap_or_default();

        if !self.inbox.try_begin(&event_id, &self.config.event_type).await? {
            // Already processed: acknowledge without reapplying.
            debug!(event_id = %event_id, "duplicate event; acknowledging");
            self.transport.ack(&message.receipt).await?;
            return Ok(false);
        }

        self.balances.apply_postings(&event.postings).await?;
        self.inbox.mark_processed(&event_id).await?;
        self.transport.ack(&message.receipt).await?;

        debug!(
            event_id = %event_id,
            postings = event.postings.len(),
            "event applied"
        );
        Ok(true)
    }
}

/// Decode a raw transport body into a ledger-posted event.
///
/// Bodies arrive in two shapes: the bus event itself, or wrapped in a
/// notification envelope whose `Message` field holds the bus event as a
/// JSON string. The bus event carries an `id` and a `detail` (object or
/// JSON string); `detail.event_id` wins over the bus `id` when present.
///
/// # Errors
///
/// Returns
/// [`Serialization`](AccountsError::Serialization) for malformed
/// bodies or missing/invalid `detail.postings`.
pub fn decode_event(body: &str) -> Result<LedgerPostedEvent> {
    let root: Value = serde_json::from_str(body)?;

    if root.get("Type").is_some() {
        let message = root
            .get("Message")
            .and_then(Value::as_str)
            .ok_or_else(|| AccountsError::Serialization(
                "notification envelope without Message".to_string(),
            ))?;
        let bus_event: Value = serde_json::from_str(message)?;
        return decode_bus_event(&bus_event);
    }

    decode_bus_event(&root)
}

fn decode_bus_event(event: &Value) -> Result<LedgerPostedEvent> {
    let bus_id = event
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.trim().is_empty());

    let detail = event
        .get("detail")
        .ok_or_else(|| AccountsError::Serialization("event detail missing".to_string()))?;

    // detail may itself arrive as a JSON string.
    let detail: Value = match detail {
        Value::String(s) => serde_json::from_str(s)?,
        other => other.clone(),
    };

    let event_id = detail
        .get("event_id")
        .and_then(Value::as_str)
        .filter(|id| !id.trim().is_empty())
        .or(bus_id)
        .map(ToString::to_string);

    let postings = detail
        .get("postings")
        .filter(|p| p.is_array())
        .ok_or_else(|| {
            AccountsError::Serialization("detail.postings missing or invalid".to_string())
        })?;
    let postings: Vec<Posting> = serde_json::from_value(postings.clone())?;

    Ok(LedgerPostedEvent { event_id, postings })
}

/// Best-effort event id extraction for failure records. Never errors.
fn extract_event_id_safe(body: &str) -> Option<String> {
    let root: Value = serde_json::from_str(body).ok()?;

    let bus_event: Value = match root.get("Message").and_then(Value::as_str) {
        Some(message) => serde_json::from_str(message).ok()?,
        None => root,
    };

    if let Some(id) = bus_event
        .get("detail")
        .and_then(|d| match d {
            Value::String(s) => serde_json::from_str::<Value>(s).ok(),
            other => Some(other.clone()),
        })
        .and_then(|d| d.get("event_id").and_then(Value::as_str).map(ToString::to_string))
    {
        if !id.trim().is_empty() {
            return Some(id);
        }
    }

    bus_event
        .get("id")
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn bus_event(event_id: &str, account_id: uuid::Uuid) -> Value {
        json!({
            "id": "bus-1",
            "detail": {
                "event_id": event_id,
                "postings": [{
                    "account_id": account_id,
                    "d_ledger": "10.00",
                    "d_available": "10.00",
                    "d_hold": "0",
                }],
            },
        })
    }

    #[test]
    fn decodes_plain_bus_event() {
        let account_id = uuid::Uuid::new_v4();
        let event = decode_event(&bus_event("evt-1", account_id).to_string()).unwrap();
        assert_eq!(event.event_id.as_deref(), Some("evt-1"));
        assert_eq!(event.postings.len(), 1);
        assert_eq!(event.postings[0].d_ledger, Decimal::new(1000, 2));
    }

    #[test]
    fn decodes_notification_envelope() {
        let account_id = uuid::Uuid::new_v4();
        let envelope = json!({
            "Type": "Notification",
            "Message": bus_event("evt-2", account_id).to_string(),
        });
        let event = decode_event(&envelope.to_string()).unwrap();
        assert_eq!(event.event_id.as_deref(), Some("evt-2"));
    }

    #[test]
    fn decodes_detail_delivered_as_string() {
        let account_id = uuid::Uuid::new_v4();
        let detail = json!({
            "event_id": "evt-3",
            "postings": [{
                "account_id": account_id,
                "d_ledger": "1",
                "d_available": "1",
                "d_hold": "0",
            }],
        });
        let body = json!({ "id": "bus-3", "detail": detail.to_string() });
        let event = decode_event(&body.to_string()).unwrap();
        assert_eq!(event.event_id.as_deref(), Some("evt-3"));
        assert_eq!(event.postings.len(), 1);
    }

    #[test]
    fn falls_back_to_bus_id_when_detail_has_no_event_id() {
        let account_id = uuid::Uuid::new_v4();
        let body = json!({
            "id": "bus-4",
            "detail": { "postings": [{
                "account_id": account_id,
                "d_ledger": "0",
                "d_available": "0",
                "d_hold": "0",
            }] },
        });
        let event = decode_event(&body.to_string()).unwrap();
        assert_eq!(event.event_id.as_deref(), Some("bus-4"));
    }

    #[test]
    fn rejects_missing_postings() {
        let body = json!({ "id": "bus-5", "detail": {} });
        assert!(decode_event(&body.to_string()).is_err());
    }

    #[test]
    fn extracts_event_id_from_malformed_processing_failures() {
        assert_eq!(extract_event_id_safe("not json"), None);
        let account_id = uuid::Uuid::new_v4();
        let body = bus_event("evt-6", account_id).to_string();
        assert_eq!(extract_event_id_safe(&body).as_deref(), Some("evt-6"));
    }
}
