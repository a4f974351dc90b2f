//! PostgreSQL storage implementations.
//!
//! The concurrency contract of every port is realized by the database
//! itself: reserve/release are single conditional `UPDATE` statements
//! (the row lock serializes concurrent callers), and the claimed-key
//! stores use `INSERT .. ON CONFLICT DO NOTHING` (the unique index
//! elects the winner). Application code never takes a lock of its own.

pub mod account;
pub mod balance;
pub mod customer;
pub mod grant;
pub mod idempotency;
pub mod inbox;
pub mod limits;

pub use account::PostgresAccountStore;
pub use balance::PostgresBalanceStore;
pub use customer::PostgresCustomerStore;
pub use grant::PostgresBonusGrantStore;
pub use idempotency::PostgresIdempotencyStore;
pub use inbox::PostgresInboxStore;
pub use limits::PostgresLimitsStore;

use crate::error::Result;
use sqlx::PgPool;

/// Run the account-service migrations.
///
/// # Errors
///
/// Returns error if a migration fails.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await.map_err(|e| {
        crate::error::AccountsError::Database(format!("migration failed: {e}"))
    })
}
