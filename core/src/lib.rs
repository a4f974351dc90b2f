//! # Banca Core
//!
//! Shared primitives for the banca services.
//!
//! The account and identity services do not share domain types; each owns
//! its own aggregates and ports. What they do share are three small
//! mechanisms:
//!
//! - [`claim`]: the "first writer wins an insert on a unique key" primitive
//!   that backs idempotency records, bonus grants, and inbox entries.
//! - [`clock`]: an injectable clock so services never read wall time
//!   directly and tests are deterministic.
//! - [`money`]: the [`money::Currency`] code used on both sides of the
//!   ledger boundary.

pub mod claim;
pub mod clock;
pub mod money;

pub use claim::{Claim, ClaimTable};
pub use clock::{Clock, FixedClock, SystemClock};
pub use money::Currency;
