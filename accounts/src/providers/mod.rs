//! Ports consumed by the account service core.
//!
//! One trait per store or external capability, injected into the
//! services. Deterministic in-memory fakes live in
//! [`mocks`](crate::mocks); production storage implementations live in
//! [`stores`](crate::stores).

pub mod account_store;
pub mod balance_store;
pub mod customer_store;
pub mod grant_store;
pub mod http_ledger;
pub mod idempotency_store;
pub mod inbox_store;
pub mod ledger_client;
pub mod limits_store;
pub mod transport;

pub use account_store::{AccountStore, CreateAccount, CreatedAccount};
pub use balance_store::BalanceStore;
pub use customer_store::CustomerStore;
pub use grant_store::BonusGrantStore;
pub use http_ledger::HttpLedgerClient;
pub use idempotency_store::IdempotencyStore;
pub use inbox_store::InboxStore;
pub use ledger_client::{CreditRequest, LedgerClient};
pub use limits_store::LimitsStore;
pub use transport::{EventTransport, TransportMessage};
