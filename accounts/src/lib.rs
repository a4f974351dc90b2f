//! # Banca Accounts
//!
//! Account service core: accounts, customers, balances with atomic
//! hold operations, the idempotent account-opening saga with its
//! one-time bonus, and the inbox-deduplicated consumer of ledger-posted
//! events.
//!
//! ## Exactly-once from at-least-once
//!
//! Every retried or redelivered invocation funnels into one of two
//! primitives:
//!
//! - **Atomic conditional updates**: `reserve_hold`/`release_hold` are
//!   single compare-and-swap writes serialized by the storage layer,
//!   so concurrent reservations against one account can never
//!   over-commit `available`.
//! - **First-writer-wins key claims**: idempotency records, bonus
//!   grants, and inbox entries are uniqueness-constrained inserts
//!   where losers observe the winner's value and treat the conflict as
//!   success.
//!
//! There is no in-process cross-account lock and no compensating
//! rollback: a failed saga call is simply retried from the top and
//! resumes past every step that already completed.
//!
//! ## Layout
//!
//! - [`state`]: domain types
//! - [`providers`]: one trait per store and external capability
//! - [`services`]: the orchestrators ([`services::AccountOpeningService`],
//!   [`services::AccountService`], [`services::CustomerService`],
//!   [`services::IdempotencyGuard`])
//! - [`consumer`]: the ledger-posted poll loop
//! - [`mocks`]: deterministic in-memory fakes (`test-utils` feature,
//!   on by default)
//! - [`stores`]: PostgreSQL implementations (`postgres` feature)

pub mod config;
pub mod consumer;
pub mod error;
pub mod providers;
pub mod services;
pub mod state;

#[cfg(feature = "test-utils")]
pub mod mocks;

pub mod stores;

pub use config::{ConsumerConfig, OpeningBonusConfig};
pub use consumer::LedgerPostedConsumer;
pub use error::{AccountsError, Result};
