//! Orchestrating services.
//!
//! Each service owns no state of its own; the only shared state is the
//! persisted stores, injected as trait implementations.

pub mod accounts;
pub mod customers;
pub mod idempotency;
pub mod opening;

pub use accounts::{AccountService, AccountView, TransferCheck, ValidateTransferCommand};
pub use customers::{CreateCustomerCommand, CustomerService, PatchCustomerCommand};
pub use idempotency::IdempotencyGuard;
pub use opening::{AccountOpeningService, OpenAccountCommand, OpenAccountResult};
