//! Production storage implementations.

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::{
    PostgresAccountStore, PostgresBalanceStore, PostgresBonusGrantStore,
    PostgresCustomerStore, PostgresIdempotencyStore, PostgresInboxStore,
    PostgresLimitsStore,
};
