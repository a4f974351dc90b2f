//! Error types for account service operations.

use crate::state::AccountId;
use thiserror::Error;

/// Result type alias for account service operations.
pub type Result<T> = std::result::Result<T, AccountsError>;

/// Error taxonomy for the account service core.
///
/// Duplicate idempotency keys, duplicate bonus grants, and
/// already-processed inbox events are deliberately *not* represented
/// here: a conflict on a claimed key is success-equivalent and callers
/// short-circuit to the existing result instead of erroring.
#[derive(Debug, Error)]
pub enum AccountsError {
    // ═══════════════════════════════════════════════════════════
    // Not-found family: surfaced to the caller, never retried
    // internally
    // ═══════════════════════════════════════════════════════════

    /// No account with this id.
    #[error("account {0} not found")]
    AccountNotFound(AccountId),

    /// No balance row for this account.
    #[error("balances for account {0} not found")]
    BalanceNotFound(AccountId),

    /// No customer with this id.
    #[error("customer not found")]
    CustomerNotFound,

    // ═══════════════════════════════════════════════════════════
    // Business errors
    // ═══════════════════════════════════════════════════════════

    /// A hold reservation exceeds the available balance.
    ///
    /// The caller decides whether to retry with a different amount.
    #[error("insufficient available funds on account {account_id}")]
    InsufficientFunds {
        /// Account whose available balance was exceeded.
        account_id: AccountId,
    },

    /// A hold release exceeds the outstanding hold.
    #[error("release exceeds current hold on account {account_id}")]
    InvalidHoldState {
        /// Account whose hold was exceeded.
        account_id: AccountId,
    },

    /// An amount was zero, negative, or otherwise unusable.
    #[error("invalid amount: {reason}")]
    InvalidAmount {
        /// Why the amount was rejected.
        reason: String,
    },

    /// A field failed validation.
    #[error("validation failed: {reason}")]
    Validation {
        /// Why the field was rejected.
        reason: String,
    },

    /// The account exists but is not in a state that permits the
    /// operation.
    #[error("account {account_id} is not active")]
    AccountNotActive {
        /// The inactive account.
        account_id: AccountId,
    },

    /// The operation's currency does not match the account's currency.
    #[error("currency mismatch on account {account_id}")]
    CurrencyMismatch {
        /// The account whose currency differs.
        account_id: AccountId,
    },

    /// A row that must be created at most once already exists.
    #[error("{what} already exists")]
    AlreadyExists {
        /// What already exists.
        what: &'static str,
    },

    // ═══════════════════════════════════════════════════════════
    // Infrastructure
    // ═══════════════════════════════════════════════════════════

    /// An external capability (ledger, accounts, customers) was
    /// unreachable or returned an error. The triggering saga step is
    /// not marked complete, so the whole call is retryable from the
    /// top.
    #[error("external service failure: {0}")]
    ExternalService(String),

    /// Message transport failure (receive or acknowledge).
    #[error("transport failure: {0}")]
    Transport(String),

    /// Storage failure.
    #[error("database failure: {0}")]
    Database(String),

    /// Payload (de)serialization failure.
    #[error("serialization failure: {0}")]
    Serialization(String),

    /// A store invariant that must hold by construction was observed
    /// broken (e.g. a grant missing immediately after a lost insert
    /// race).
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for AccountsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for AccountsError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}
