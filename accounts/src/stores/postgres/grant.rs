//! PostgreSQL opening-bonus grant store.

use crate::error::{AccountsError, Result};
use crate::providers::BonusGrantStore;
use crate::state::{AccountId, JournalId, OpeningBonusGrant};
use banca_core::{Claim, Currency};
use sqlx::{PgPool, Row};

/// Grant rows claimed by `INSERT .. ON CONFLICT DO NOTHING` on the
/// unique idempotency key; exactly one concurrent caller wins.
#[derive(Clone)]
pub struct PostgresBonusGrantStore {
    pool: PgPool,
}

impl PostgresBonusGrantStore {
    /// Create the store on a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, key: &str) -> Result<Option<OpeningBonusGrant>> {
        let row = sqlx::query(
            "SELECT idempotency_key, account_id, journal_id, amount, currency
             FROM account_opening_bonus_grants
             WHERE idempotency_key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            let currency: String = row.try_get("currency")?;
            Ok(OpeningBonusGrant {
                idempotency_key: row.try_get("idempotency_key")?,
                account_id: AccountId(row.try_get("account_id")?),
                journal_id: JournalId(row.try_get("journal_id")?),
                amount: row.try_get("amount")?,
                currency: Currency::parse(&currency)
                    .map_err(|e| AccountsError::Database(e.to_string()))?,
            })
        })
        .transpose()
    }
}

impl BonusGrantStore for PostgresBonusGrantStore {
    async fn find_by_key(&self, key: &str) -> Result<Option<OpeningBonusGrant>> {
        if key.trim().is_empty() {
            return Ok(None);
        }
        self.fetch(key).await
    }

    async fn try_insert(&self, grant: OpeningBonusGrant) -> Result<Claim<OpeningBonusGrant>> {
        let result = sqlx::query(
            "INSERT INTO account_opening_bonus_grants
                 (idempotency_key, account_id, journal_id, amount, currency)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (idempotency_key) DO NOTHING",
        )
        .bind(&grant.idempotency_key)
        .bind(grant.account_id.0)
        .bind(&grant.journal_id.0)
        .bind(grant.amount)
        .bind(grant.currency.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(Claim::First);
        }

        match self.fetch(&grant.idempotency_key).await? {
            Some(existing) => Ok(Claim::Existing(existing)),
            None => Err(AccountsError::Internal(
                "bonus grant missing after conflicting insert".to_string(),
            )),
        }
    }
}
