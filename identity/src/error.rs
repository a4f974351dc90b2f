//! Error types for registration and activation operations.

use crate::state::{RegistrationId, RegistrationState};
use thiserror::Error;

/// Result type alias for identity operations.
pub type Result<T> = std::result::Result<T, IdentityError>;

/// Error taxonomy for the registration/onboarding core.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// No registration with this id.
    #[error("registration {0} not found")]
    RegistrationNotFound(RegistrationId),

    /// The registration is not in a state that permits the operation.
    /// Surfaced to the caller; never retried internally.
    #[error("registration is {state:?}, operation not permitted")]
    InvalidRegistrationState {
        /// The state that blocked the operation.
        state: RegistrationState,
    },

    /// An external capability (customers, accounts, ledger) was
    /// unreachable or erroring. The triggering saga sub-step is not
    /// persisted, so the whole call is retryable and resumes at the
    /// first incomplete sub-step.
    #[error("external service failure: {0}")]
    ExternalService(String),

    /// Storage failure.
    #[error("database failure: {0}")]
    Database(String),

    /// Payload (de)serialization failure.
    #[error("serialization failure: {0}")]
    Serialization(String),

    /// A persisted-state invariant was observed broken.
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for IdentityError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}
