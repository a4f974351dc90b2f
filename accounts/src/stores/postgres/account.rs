//! PostgreSQL account store.

use crate::error::{AccountsError, Result};
use crate::providers::AccountStore;
use crate::state::{Account, AccountId, AccountStatus, CustomerId};
use banca_core::Currency;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

const fn status_str(status: AccountStatus) -> &'static str {
    match status {
        AccountStatus::Active => "active",
        AccountStatus::Suspended => "suspended",
        AccountStatus::Closed => "closed",
    }
}

fn status_from_str(status: &str) -> AccountStatus {
    match status {
        "suspended" => AccountStatus::Suspended,
        "closed" => AccountStatus::Closed,
        _ => AccountStatus::Active,
    }
}

fn account_from_row(row: &PgRow) -> Result<Account> {
    let status: String = row.try_get("status")?;
    let currency: String = row.try_get("currency")?;
    Ok(Account {
        id: AccountId(row.try_get("id")?),
        customer_id: CustomerId(row.try_get("customer_id")?),
        product_type: row.try_get("product_type")?,
        currency: Currency::parse(&currency)
            .map_err(|e| AccountsError::Database(e.to_string()))?,
        status: status_from_str(&status),
        account_number: row.try_get("account_number")?,
        opened_at: row.try_get("opened_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

const SELECT_COLUMNS: &str = "id, customer_id, product_type, currency, status, \
                              account_number, opened_at, updated_at";

/// Account rows.
#[derive(Clone)]
pub struct PostgresAccountStore {
    pool: PgPool,
}

impl PostgresAccountStore {
    /// Create the store on a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl AccountStore for PostgresAccountStore {
    async fn insert(&self, account: &Account) -> Result<()> {
        sqlx::query(
            "INSERT INTO accounts
                 (id, customer_id, product_type, currency, status,
                  account_number, opened_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(account.id.0)
        .bind(account.customer_id.0)
        .bind(&account.product_type)
        .bind(account.currency.as_str())
        .bind(status_str(account.status))
        .bind(&account.account_number)
        .bind(account.opened_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, account_id: AccountId) -> Result<Option<Account>> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(account_id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn find_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Account>> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM accounts
             WHERE customer_id = $1 ORDER BY opened_at"
        ))
        .bind(customer_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(account_from_row).collect()
    }
}
