//! Deterministic in-memory fakes for every port.
//!
//! Used by the integration tests and available to downstream crates
//! under the `test-utils` feature (on by default). The balance fake
//! performs its conditional updates inside one critical section, which
//! models exactly the row-level serialization a storage engine provides
//! for the production store's single-statement updates.

pub mod account_store;
pub mod balance_store;
pub mod customer_store;
pub mod grant_store;
pub mod idempotency_store;
pub mod inbox_store;
pub mod ledger_client;
pub mod limits_store;
pub mod transport;

pub use account_store::MockAccountStore;
pub use balance_store::MockBalanceStore;
pub use customer_store::MockCustomerStore;
pub use grant_store::MockBonusGrantStore;
pub use idempotency_store::MockIdempotencyStore;
pub use inbox_store::MockInboxStore;
pub use ledger_client::MockLedgerClient;
pub use limits_store::MockLimitsStore;
pub use transport::MockEventTransport;
