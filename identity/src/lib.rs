//! # Banca Identity
//!
//! Registration/onboarding core: the registration-intent state machine
//! and the resumable activation saga (customer → account → bonus).
//!
//! The saga holds no lock across its external calls and performs no
//! compensating rollback. Safety comes from two things: every external
//! capability deduplicates on an idempotency key derived from the
//! registration's stable activation reference, and every sub-step
//! output is persisted the instant it is obtained, so a retry after
//! any failure resumes exactly at the first incomplete sub-step.
//!
//! ## Layout
//!
//! - [`state`]: the flat saga record and its state enum
//! - [`providers`]: the registration store and capability ports, with
//!   their HTTP production implementations
//! - [`services`]: [`services::OnboardingService`] (pre-activation
//!   transitions) and [`services::ActivationService`] (the saga)
//! - [`mocks`]: deterministic fakes (`test-utils` feature, on by
//!   default)
//! - [`stores`]: PostgreSQL implementation (`postgres` feature)

pub mod config;
pub mod error;
pub mod providers;
pub mod services;
pub mod state;

#[cfg(feature = "test-utils")]
pub mod mocks;

pub mod stores;

pub use config::ActivationConfig;
pub use error::{IdentityError, Result};
