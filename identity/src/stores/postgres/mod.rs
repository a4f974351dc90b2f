//! PostgreSQL storage implementations.

pub mod registration;

pub use registration::PostgresRegistrationStore;

use crate::error::Result;
use sqlx::PgPool;

/// Run the identity-service migrations.
///
/// # Errors
///
/// Returns error if a migration fails.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await.map_err(|e| {
        crate::error::IdentityError::Database(format!("migration failed: {e}"))
    })
}
