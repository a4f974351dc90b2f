//! Registration domain types.
//!
//! Saga state is a flat tagged record: one state enum plus a handful of
//! nullable per-step output fields, each persisted the instant it is
//! obtained.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a registration intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistrationId(pub uuid::Uuid);

impl RegistrationId {
    /// Generate a new random `RegistrationId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RegistrationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registration lifecycle.
///
/// `Activated` is terminal. `Rejected` is reachable from `Started` and
/// `KycConfirmed` by an out-of-band decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationState {
    /// Intent captured, KYC pending.
    Started,
    /// KYC confirmed; activation may begin.
    KycConfirmed,
    /// Activation in flight (possibly across retries).
    Activating,
    /// Fully activated (terminal).
    Activated,
    /// Rejected (terminal).
    Rejected,
}

/// A registration intent and the activation saga's persisted progress.
///
/// The three nullable output fields are written one at a time, each
/// durably persisted before the saga proceeds, so a crash after any
/// sub-step resumes at the next incomplete one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationIntent {
    /// Unique id.
    pub id: RegistrationId,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// Acquisition channel, e.g. `"mobile"`.
    pub channel: String,
    /// Current lifecycle state.
    pub state: RegistrationState,
    /// Stable activation reference, assigned on first activation entry;
    /// every external sub-step keys its idempotency on it.
    pub activation_ref: Option<String>,
    /// Output of sub-step 1 (customer creation).
    pub customer_id: Option<String>,
    /// Output of sub-step 2 (primary account creation).
    pub primary_account_id: Option<String>,
    /// Output of sub-step 3 (opening-bonus credit).
    pub bonus_journal_id: Option<String>,
    /// When activation completed.
    pub activated_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

impl RegistrationIntent {
    /// A fresh `Started` intent.
    #[must_use]
    pub fn started(
        id: RegistrationId,
        email: String,
        phone: String,
        channel: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            phone,
            channel,
            state: RegistrationState::Started,
            activation_ref: None,
            customer_id: None,
            primary_account_id: None,
            bonus_journal_id: None,
            activated_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Terminal result of the activation saga. Identical across retries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationResult {
    /// The registration.
    pub registration_id: RegistrationId,
    /// Final state (`ACTIVATED`).
    pub state: RegistrationState,
    /// Customer created by the saga.
    pub customer_id: String,
    /// Primary account created by the saga.
    pub primary_account_id: String,
    /// The stable activation reference.
    pub activation_ref: String,
    /// Journal id of the opening-bonus posting.
    pub bonus_journal_id: String,
    /// When activation completed.
    pub activated_at: DateTime<Utc>,
}
