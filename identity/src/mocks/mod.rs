//! Deterministic in-memory fakes for every port.

pub mod clients;
pub mod registration_store;

pub use clients::{MockAccountsClient, MockCustomersClient, MockLedgerClient};
pub use registration_store::MockRegistrationStore;
