//! PostgreSQL idempotency record store.

use crate::error::Result;
use crate::providers::IdempotencyStore;
use crate::state::IdempotencyRecord;
use sqlx::{PgPool, Row};

/// Idempotency records claimed on the unique key: the first writer
/// wins, later saves are silently ignored.
#[derive(Clone)]
pub struct PostgresIdempotencyStore {
    pool: PgPool,
}

impl PostgresIdempotencyStore {
    /// Create the store on a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl IdempotencyStore for PostgresIdempotencyStore {
    async fn find(&self, key: &str) -> Result<Option<IdempotencyRecord>> {
        let row = sqlx::query(
            "SELECT key, operation, status_code, response, created_at
             FROM idempotency_records WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            let status_code: i32 = row.try_get("status_code")?;
            Ok(IdempotencyRecord {
                key: row.try_get("key")?,
                operation: row.try_get("operation")?,
                status_code: u16::try_from(status_code).unwrap_or(500),
                response: row.try_get("response")?,
                created_at: row.try_get("created_at")?,
            })
        })
        .transpose()
    }

    async fn save(&self, record: IdempotencyRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO idempotency_records (key, operation, status_code, response, created_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (key) DO NOTHING",
        )
        .bind(&record.key)
        .bind(&record.operation)
        .bind(i32::from(record.status_code))
        .bind(&record.response)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
