//! PostgreSQL event inbox store.

use crate::error::Result;
use crate::providers::InboxStore;
use crate::state::{InboxEvent, InboxStatus};
use sqlx::{PgPool, Row};
use tracing::warn;

fn status_from_str(status: &str) -> InboxStatus {
    match status {
        "processed" => InboxStatus::Processed,
        "failed" => InboxStatus::Failed,
        _ => InboxStatus::Received,
    }
}

/// Inbox rows claimed by `INSERT .. ON CONFLICT DO NOTHING` on the
/// unique event id.
#[derive(Clone)]
pub struct PostgresInboxStore {
    pool: PgPool,
}

impl PostgresInboxStore {
    /// Create the store on a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl InboxStore for PostgresInboxStore {
    async fn try_begin(&self, event_id: &str, event_type: &str) -> Result<bool> {
        if event_id.trim().is_empty() {
            // No dedup possible; process anyway.
            return Ok(true);
        }

        let result = sqlx::query(
            "INSERT INTO inbox_events (event_id, event_type, received_at, status)
             VALUES ($1, $2, now(), 'received')
             ON CONFLICT (event_id) DO NOTHING",
        )
        .bind(event_id)
        .bind(event_type)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }

        // Already on file: re-admit unless processing completed.
        let row = sqlx::query("SELECT status FROM inbox_events WHERE event_id = $1")
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(match row {
            Some(row) => {
                let status: String = row.try_get("status")?;
                status_from_str(&status) != InboxStatus::Processed
            }
            None => true,
        })
    }

    async fn mark_processed(&self, event_id: &str) -> Result<()> {
        if event_id.trim().is_empty() {
            return Ok(());
        }
        sqlx::query(
            "UPDATE inbox_events
             SET status = 'processed', processed_at = now(), error = NULL
             WHERE event_id = $1",
        )
        .bind(event_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn mark_failed_safe(&self, event_id: &str, event_type: &str, error: &str) {
        if event_id.trim().is_empty() {
            return;
        }
        let outcome = sqlx::query(
            "INSERT INTO inbox_events (event_id, event_type, received_at, status, error)
             VALUES ($1, $2, now(), 'failed', $3)
             ON CONFLICT (event_id) DO UPDATE SET status = 'failed', error = $3",
        )
        .bind(event_id)
        .bind(event_type)
        .bind(error)
        .execute(&self.pool)
        .await;

        // Never mask the original processing error with a bookkeeping
        // failure.
        if let Err(err) = outcome {
            warn!(event_id = %event_id, error = %err, "failed to record inbox failure");
        }
    }

    async fn find(&self, event_id: &str) -> Result<Option<InboxEvent>> {
        let row = sqlx::query(
            "SELECT event_id, event_type, received_at, processed_at, status, error
             FROM inbox_events WHERE event_id = $1",
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            let status: String = row.try_get("status")?;
            Ok(InboxEvent {
                event_id: row.try_get("event_id")?,
                event_type: row.try_get("event_type")?,
                received_at: row.try_get("received_at")?,
                processed_at: row.try_get("processed_at")?,
                status: status_from_str(&status),
                error: row.try_get("error")?,
            })
        })
        .transpose()
    }
}
