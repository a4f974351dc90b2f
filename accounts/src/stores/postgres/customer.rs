//! PostgreSQL customer store.

use crate::error::{AccountsError, Result};
use crate::providers::CustomerStore;
use crate::state::{Customer, CustomerId};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

fn customer_from_row(row: &PgRow) -> Result<Customer> {
    Ok(Customer {
        id: CustomerId(row.try_get("id")?),
        full_name: row.try_get("full_name")?,
        birth_date: row.try_get("birth_date")?,
        tin: row.try_get("tin")?,
        risk_segment: row.try_get("risk_segment")?,
        status: row.try_get("status")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Customer rows.
#[derive(Clone)]
pub struct PostgresCustomerStore {
    pool: PgPool,
}

impl PostgresCustomerStore {
    /// Create the store on a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CustomerStore for PostgresCustomerStore {
    async fn insert(&self, customer: &Customer) -> Result<()> {
        sqlx::query(
            "INSERT INTO customers
                 (id, full_name, birth_date, tin, risk_segment, status,
                  email, phone, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(customer.id.0)
        .bind(&customer.full_name)
        .bind(&customer.birth_date)
        .bind(&customer.tin)
        .bind(&customer.risk_segment)
        .bind(&customer.status)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, customer_id: CustomerId) -> Result<Option<Customer>> {
        let row = sqlx::query(
            "SELECT id, full_name, birth_date, tin, risk_segment, status,
                    email, phone, created_at
             FROM customers WHERE id = $1",
        )
        .bind(customer_id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(customer_from_row).transpose()
    }

    async fn exists(&self, customer_id: CustomerId) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM customers WHERE id = $1")
            .bind(customer_id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn update(&self, customer: &Customer) -> Result<()> {
        let result = sqlx::query(
            "UPDATE customers
             SET full_name = $2, risk_segment = $3, status = $4,
                 email = $5, phone = $6
             WHERE id = $1",
        )
        .bind(customer.id.0)
        .bind(&customer.full_name)
        .bind(&customer.risk_segment)
        .bind(&customer.status)
        .bind(&customer.email)
        .bind(&customer.phone)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AccountsError::CustomerNotFound);
        }
        Ok(())
    }
}
