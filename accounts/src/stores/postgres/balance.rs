//! PostgreSQL balance store.

use crate::error::{AccountsError, Result};
use crate::providers::BalanceStore;
use crate::state::{AccountId, Balance, Posting};
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};

/// Balance rows with single-statement conditional updates.
///
/// `reserve_hold` and `release_hold` are one atomic `UPDATE` each; the
/// guard (`available >= amount` / `hold >= amount`) is evaluated under
/// the row lock, so two concurrent reservations can never both succeed
/// when only one could legally be funded.
#[derive(Clone)]
pub struct PostgresBalanceStore {
    pool: PgPool,
}

impl PostgresBalanceStore {
    /// Create the store on a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, account_id: AccountId) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM account_balances WHERE account_id = $1")
            .bind(account_id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}

impl BalanceStore for PostgresBalanceStore {
    async fn init_zero(&self, account_id: AccountId) -> Result<()> {
        let result = sqlx::query(
            "INSERT INTO account_balances (account_id, ledger, available, hold)
             VALUES ($1, 0, 0, 0)
             ON CONFLICT (account_id) DO NOTHING",
        )
        .bind(account_id.0)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AccountsError::AlreadyExists {
                what: "balance row",
            });
        }
        Ok(())
    }

    async fn find(&self, account_id: AccountId) -> Result<Option<Balance>> {
        let row = sqlx::query(
            "SELECT ledger, available, hold FROM account_balances WHERE account_id = $1",
        )
        .bind(account_id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            Ok(Balance {
                account_id,
                ledger: row.try_get("ledger")?,
                available: row.try_get("available")?,
                hold: row.try_get("hold")?,
            })
        })
        .transpose()
    }

    async fn reserve_hold(&self, account_id: AccountId, amount: Decimal) -> Result<Decimal> {
        let row = sqlx::query(
            "UPDATE account_balances
             SET hold = hold + $2, available = available - $2
             WHERE account_id = $1 AND available >= $2
             RETURNING hold",
        )
        .bind(account_id.0)
        .bind(amount)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(row.try_get("hold")?),
            // Zero rows: either the row does not exist or the guard
            // failed; disambiguate after the fact.
            None if self.exists(account_id).await? => {
                Err(AccountsError::InsufficientFunds { account_id })
            }
            None => Err(AccountsError::BalanceNotFound(account_id)),
        }
    }

    async fn release_hold(&self, account_id: AccountId, amount: Decimal) -> Result<Decimal> {
        let row = sqlx::query(
            "UPDATE account_balances
             SET hold = hold - $2, available = available + $2
             WHERE account_id = $1 AND hold >= $2
             RETURNING hold",
        )
        .bind(account_id.0)
        .bind(amount)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(row.try_get("hold")?),
            None if self.exists(account_id).await? => {
                Err(AccountsError::InvalidHoldState { account_id })
            }
            None => Err(AccountsError::BalanceNotFound(account_id)),
        }
    }

    async fn apply_deltas(
        &self,
        account_id: AccountId,
        d_ledger: Decimal,
        d_available: Decimal,
        d_hold: Decimal,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE account_balances
             SET ledger = ledger + $2, available = available + $3, hold = hold + $4
             WHERE account_id = $1",
        )
        .bind(account_id.0)
        .bind(d_ledger)
        .bind(d_available)
        .bind(d_hold)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AccountsError::BalanceNotFound(account_id));
        }
        Ok(())
    }

    async fn apply_postings(&self, postings: &[Posting]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for posting in postings {
            let result = sqlx::query(
                "UPDATE account_balances
                 SET ledger = ledger + $2, available = available + $3, hold = hold + $4
                 WHERE account_id = $1",
            )
            .bind(posting.account_id.0)
            .bind(posting.d_ledger)
            .bind(posting.d_available)
            .bind(posting.d_hold)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                // Dropping the transaction rolls back everything
                // already applied in this batch.
                return Err(AccountsError::BalanceNotFound(posting.account_id));
            }
        }

        tx.commit().await?;
        Ok(())
    }
}
