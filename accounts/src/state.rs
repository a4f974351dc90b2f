//! Account service domain types.

use banca_core::Currency;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════
// ID Types
// ═══════════════════════════════════════════════════════════════════════

/// Unique identifier for an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub uuid::Uuid);

impl AccountId {
    /// Generate a new random `AccountId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub uuid::Uuid);

impl CustomerId {
    /// Generate a new random `CustomerId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for CustomerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// External ledger journal id, assigned by the ledger capability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JournalId(pub String);

impl fmt::Display for JournalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Accounts & Customers
// ═══════════════════════════════════════════════════════════════════════

/// Account lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Open and usable.
    Active,
    /// Temporarily blocked.
    Suspended,
    /// Terminally closed.
    Closed,
}

/// A customer account. Identity is immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account id.
    pub id: AccountId,
    /// Owning customer.
    pub customer_id: CustomerId,
    /// Product type, e.g. `"checking"` or `"savings"`.
    pub product_type: String,
    /// Account currency.
    pub currency: Currency,
    /// Lifecycle status.
    pub status: AccountStatus,
    /// 12-digit display number, derived from the account id.
    pub account_number: String,
    /// When the account was opened.
    pub opened_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Derive the 12-digit display number for an account id.
    ///
    /// Stable for the life of the account: the same id always formats to
    /// the same number.
    #[must_use]
    pub fn derive_number(id: AccountId) -> String {
        let digits = id.0.as_u128() % 1_000_000_000_000;
        format!("{digits:012}")
    }
}

/// A customer record, created through the customer-creation capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Unique customer id.
    pub id: CustomerId,
    /// Legal name.
    pub full_name: String,
    /// Date of birth (ISO date string).
    pub birth_date: String,
    /// Tax identification number.
    pub tin: String,
    /// Risk segment: `low`, `medium`, or `high`.
    pub risk_segment: String,
    /// `active` or `suspended`.
    pub status: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Per-account transfer limits. Zero means unlimited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountLimits {
    /// Account these limits apply to.
    pub account_id: AccountId,
    /// Maximum outgoing amount per day.
    pub daily_out: Decimal,
    /// Maximum incoming amount per day.
    pub daily_in: Decimal,
}

// ═══════════════════════════════════════════════════════════════════════
// Balances
// ═══════════════════════════════════════════════════════════════════════

/// Per-account balance record (1:1 with [`Account`]).
///
/// Invariant: `available ≥ 0` and `hold ≥ 0` at all times. The row is
/// created zero-valued at opening time and mutated only through the
/// atomic operations on
/// [`BalanceStore`](crate::providers::BalanceStore); it is never
/// deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    /// Account this balance belongs to.
    pub account_id: AccountId,
    /// Total recorded value.
    pub ledger: Decimal,
    /// Spendable value (`ledger` minus outstanding holds).
    pub available: Decimal,
    /// Reserved-but-unsettled value.
    pub hold: Decimal,
}

impl Balance {
    /// A zero-valued balance for `account_id`.
    #[must_use]
    pub fn zero(account_id: AccountId) -> Self {
        Self {
            account_id,
            ledger: Decimal::ZERO,
            available: Decimal::ZERO,
            hold: Decimal::ZERO,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Claimed-key records
// ═══════════════════════════════════════════════════════════════════════

/// Cached outcome of a request-scoped operation, written once per
/// `(key, operation)` on first successful completion and read-only
/// afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdempotencyRecord {
    /// Caller-supplied idempotency key.
    pub key: String,
    /// Operation name the key was used for.
    pub operation: String,
    /// Status code of the original completion.
    pub status_code: u16,
    /// Serialized response payload.
    pub response: serde_json::Value,
    /// When the record was written.
    pub created_at: DateTime<Utc>,
}

/// Proof that the one-time opening bonus was applied for a key.
///
/// Existence of a row is the proof; the row is written exactly once per
/// key via a uniqueness-constrained insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningBonusGrant {
    /// The bonus idempotency key (caller key + fixed suffix).
    pub idempotency_key: String,
    /// Account the bonus was credited to.
    pub account_id: AccountId,
    /// Journal id of the ledger posting.
    pub journal_id: JournalId,
    /// Bonus amount.
    pub amount: Decimal,
    /// Bonus currency.
    pub currency: Currency,
}

/// Processing status of an inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InboxStatus {
    /// Seen, not yet applied.
    Received,
    /// Applied; must never be reapplied.
    Processed,
    /// Last processing attempt failed; eligible for retry.
    Failed,
}

/// Durable record of a seen inbound event id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboxEvent {
    /// External event id.
    pub event_id: String,
    /// Event type, e.g. `ledger.journal.posted`.
    pub event_type: String,
    /// First time the id was seen.
    pub received_at: DateTime<Utc>,
    /// When processing completed, if it has.
    pub processed_at: Option<DateTime<Utc>>,
    /// Current status.
    pub status: InboxStatus,
    /// Error from the last failed attempt, if any.
    pub error: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════
// Ledger events
// ═══════════════════════════════════════════════════════════════════════

/// One signed adjustment to an account's balance values, originating
/// from an externally confirmed ledger transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    /// Account to adjust.
    pub account_id: AccountId,
    /// Delta to the total recorded value.
    pub d_ledger: Decimal,
    /// Delta to the spendable value.
    pub d_available: Decimal,
    /// Delta to the reserved value.
    pub d_hold: Decimal,
}

/// A decoded `ledger.journal.posted` event: one external event id and
/// the postings it confirms.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerPostedEvent {
    /// External event id used for inbox deduplication. `None` when the
    /// producer supplied no usable id (processed without dedup).
    pub event_id: Option<String>,
    /// Balance adjustments confirmed by the upstream ledger.
    pub postings: Vec<Posting>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn account_number_is_twelve_digits_and_stable() {
        let id = AccountId::new();
        let a = Account::derive_number(id);
        let b = Account::derive_number(id);
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
        assert!(a.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn posting_decodes_decimal_strings() {
        let posting: Posting = serde_json::from_value(serde_json::json!({
            "account_id": uuid::Uuid::new_v4(),
            "d_ledger": "12.34",
            "d_available": "-12.34",
            "d_hold": "0",
        }))
        .unwrap();
        assert_eq!(posting.d_ledger, Decimal::new(1234, 2));
        assert_eq!(posting.d_available, Decimal::new(-1234, 2));
    }
}
