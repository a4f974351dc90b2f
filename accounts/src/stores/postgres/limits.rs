//! PostgreSQL account limits store.

use crate::error::Result;
use crate::providers::LimitsStore;
use crate::state::{AccountId, AccountLimits};
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};

/// Account limit rows.
#[derive(Clone)]
pub struct PostgresLimitsStore {
    pool: PgPool,
}

impl PostgresLimitsStore {
    /// Create the store on a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl LimitsStore for PostgresLimitsStore {
    async fn find(&self, account_id: AccountId) -> Result<Option<AccountLimits>> {
        let row = sqlx::query(
            "SELECT daily_out, daily_in FROM account_limits WHERE account_id = $1",
        )
        .bind(account_id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            Ok(AccountLimits {
                account_id,
                daily_out: row.try_get("daily_out")?,
                daily_in: row.try_get("daily_in")?,
            })
        })
        .transpose()
    }

    async fn patch(
        &self,
        account_id: AccountId,
        daily_out: Option<Decimal>,
        daily_in: Option<Decimal>,
    ) -> Result<AccountLimits> {
        let row = sqlx::query(
            "INSERT INTO account_limits (account_id, daily_out, daily_in)
             VALUES ($1, COALESCE($2, 0), COALESCE($3, 0))
             ON CONFLICT (account_id) DO UPDATE
             SET daily_out = COALESCE($2, account_limits.daily_out),
                 daily_in = COALESCE($3, account_limits.daily_in)
             RETURNING daily_out, daily_in",
        )
        .bind(account_id.0)
        .bind(daily_out)
        .bind(daily_in)
        .fetch_one(&self.pool)
        .await?;

        Ok(AccountLimits {
            account_id,
            daily_out: row.try_get("daily_out")?,
            daily_in: row.try_get("daily_in")?,
        })
    }
}
