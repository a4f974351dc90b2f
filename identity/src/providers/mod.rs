//! Ports consumed by the registration core.

pub mod clients;
pub mod http;
pub mod registration_store;

pub use clients::{AccountsClient, CustomerProfile, CustomersClient, LedgerClient};
pub use http::{HttpAccountsClient, HttpCustomersClient, HttpLedgerClient};
pub use registration_store::RegistrationStore;
