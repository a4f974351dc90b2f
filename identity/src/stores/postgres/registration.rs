//! PostgreSQL registration store.

use crate::error::{IdentityError, Result};
use crate::providers::RegistrationStore;
use crate::state::{RegistrationId, RegistrationIntent, RegistrationState};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

const fn state_str(state: RegistrationState) -> &'static str {
    match state {
        RegistrationState::Started => "STARTED",
        RegistrationState::KycConfirmed => "KYC_CONFIRMED",
        RegistrationState::Activating => "ACTIVATING",
        RegistrationState::Activated => "ACTIVATED",
        RegistrationState::Rejected => "REJECTED",
    }
}

fn state_from_str(state: &str) -> Result<RegistrationState> {
    match state {
        "STARTED" => Ok(RegistrationState::Started),
        "KYC_CONFIRMED" => Ok(RegistrationState::KycConfirmed),
        "ACTIVATING" => Ok(RegistrationState::Activating),
        "ACTIVATED" => Ok(RegistrationState::Activated),
        "REJECTED" => Ok(RegistrationState::Rejected),
        other => Err(IdentityError::Database(format!(
            "unknown registration state {other:?}"
        ))),
    }
}

fn intent_from_row(row: &PgRow) -> Result<RegistrationIntent> {
    let state: String = row.try_get("state")?;
    Ok(RegistrationIntent {
        id: RegistrationId(row.try_get("id")?),
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        channel: row.try_get("channel")?,
        state: state_from_str(&state)?,
        activation_ref: row.try_get("activation_ref")?,
        customer_id: row.try_get("customer_id")?,
        primary_account_id: row.try_get("primary_account_id")?,
        bonus_journal_id: row.try_get("bonus_journal_id")?,
        activated_at: row.try_get("activated_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Registration intent rows.
#[derive(Clone)]
pub struct PostgresRegistrationStore {
    pool: PgPool,
}

impl PostgresRegistrationStore {
    /// Create the store on a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl RegistrationStore for PostgresRegistrationStore {
    async fn insert(&self, intent: &RegistrationIntent) -> Result<()> {
        sqlx::query(
            "INSERT INTO registration_intents
                 (id, email, phone, channel, state, activation_ref,
                  customer_id, primary_account_id, bonus_journal_id,
                  activated_at, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(intent.id.0)
        .bind(&intent.email)
        .bind(&intent.phone)
        .bind(&intent.channel)
        .bind(state_str(intent.state))
        .bind(&intent.activation_ref)
        .bind(&intent.customer_id)
        .bind(&intent.primary_account_id)
        .bind(&intent.bonus_journal_id)
        .bind(intent.activated_at)
        .bind(intent.created_at)
        .bind(intent.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, id: RegistrationId) -> Result<Option<RegistrationIntent>> {
        let row = sqlx::query(
            "SELECT id, email, phone, channel, state, activation_ref,
                    customer_id, primary_account_id, bonus_journal_id,
                    activated_at, created_at, updated_at
             FROM registration_intents WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(intent_from_row).transpose()
    }

    async fn update(&self, intent: &RegistrationIntent) -> Result<()> {
        let result = sqlx::query(
            "UPDATE registration_intents
             SET state = $2, activation_ref = $3, customer_id = $4,
                 primary_account_id = $5, bonus_journal_id = $6,
                 activated_at = $7, updated_at = $8
             WHERE id = $1",
        )
        .bind(intent.id.0)
        .bind(state_str(intent.state))
        .bind(&intent.activation_ref)
        .bind(&intent.customer_id)
        .bind(&intent.primary_account_id)
        .bind(&intent.bonus_journal_id)
        .bind(intent.activated_at)
        .bind(intent.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(IdentityError::RegistrationNotFound(intent.id));
        }
        Ok(())
    }
}
