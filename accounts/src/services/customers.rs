//! Customer service.

use crate::error::{AccountsError, Result};
use crate::providers::{CustomerStore, IdempotencyStore};
use crate::services::IdempotencyGuard;
use crate::state::{Customer, CustomerId};
use banca_core::{Clock, SystemClock};
use tracing::info;

const CREATE_OPERATION: &str = "create_customer";

/// Input to [`CustomerService::create_customer`].
#[derive(Debug, Clone)]
pub struct CreateCustomerCommand {
    /// Legal name.
    pub full_name: String,
    /// Date of birth (ISO date string).
    pub birth_date: String,
    /// Tax identification number.
    pub tin: String,
    /// Risk segment; defaults to `low`.
    pub risk_segment: Option<String>,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
}

/// Input to [`CustomerService::patch`]. Only provided fields change.
#[derive(Debug, Clone, Default)]
pub struct PatchCustomerCommand {
    /// New legal name.
    pub full_name: Option<String>,
    /// New risk segment (`low`/`medium`/`high`).
    pub risk_segment: Option<String>,
    /// New status (`active`/`suspended`).
    pub status: Option<String>,
    /// New contact email.
    pub email: Option<String>,
    /// New contact phone.
    pub phone: Option<String>,
}

/// Customer creation and maintenance.
///
/// Creation is the customer-creation capability the activation saga
/// calls, so it is deduplicated through the idempotency guard: a
/// retried call with the same key returns the original customer id
/// without creating a second customer.
#[derive(Debug, Clone)]
pub struct CustomerService<C, I, K = SystemClock> {
    customers: C,
    guard: IdempotencyGuard<I, K>,
    clock: K,
}

impl<C: CustomerStore, I: IdempotencyStore> CustomerService<C, I> {
    /// Create the service on the system clock.
    pub const fn new(customers: C, idempotency: I) -> Self {
        Self {
            customers,
            guard: IdempotencyGuard::with_clock(idempotency, SystemClock),
            clock: SystemClock,
        }
    }
}

impl<C, I, K> CustomerService<C, I, K>
where
    C: CustomerStore,
    I: IdempotencyStore,
    K: Clock + Clone,
{
    /// Create the service on a caller-supplied clock.
    pub fn with_clock(customers: C, idempotency: I, clock: K) -> Self {
        Self {
            customers,
            guard: IdempotencyGuard::with_clock(idempotency, clock.clone()),
            clock,
        }
    }

    /// Create a customer, deduplicated by the caller's idempotency key.
    ///
    /// # Errors
    ///
    /// Returns [`Validation`](AccountsError::Validation) for a bad
    /// risk segment, or a storage error.
    pub async fn create_customer(
        &self,
        idempotency_key: &str,
        cmd: CreateCustomerCommand,
    ) -> Result<CustomerId> {
        if let Some(cached) = self
            .guard
            .try_get::<CustomerId>(idempotency_key, CREATE_OPERATION)
            .await?
        {
            return Ok(cached);
        }

        let risk_segment = cmd.risk_segment.unwrap_or_else(|| "low".to_string());
        validate_risk_segment(&risk_segment)?;

        let customer = Customer {
            id: CustomerId::new(),
            full_name: cmd.full_name,
            birth_date: cmd.birth_date,
            tin: cmd.tin,
            risk_segment,
            status: "active".to_string(),
            email: cmd.email,
            phone: cmd.phone,
            created_at: self.clock.now(),
        };
        self.customers.insert(&customer).await?;

        self.guard
            .save(idempotency_key, CREATE_OPERATION, 201, &customer.id)
            .await?;

        info!(customer_id = %customer.id, "customer created");
        Ok(customer.id)
    }

    /// Patch an existing customer.
    ///
    /// # Errors
    ///
    /// Returns
    /// [`CustomerNotFound`](AccountsError::CustomerNotFound) for an
    /// unknown customer, or a validation/storage error.
    pub async fn patch(
        &self,
        customer_id: CustomerId,
        cmd: PatchCustomerCommand,
    ) -> Result<()> {
        if let Some(segment) = &cmd.risk_segment {
            validate_risk_segment(segment)?;
        }
        if let Some(status) = &cmd.status {
            if !matches!(status.as_str(), "active" | "suspended") {
                return Err(AccountsError::Validation {
                    reason: format!("invalid customerStatus: {status}"),
                });
            }
        }

        let mut customer = self
            .customers
            .find(customer_id)
            .await?
            .ok_or(AccountsError::CustomerNotFound)?;

        if let Some(full_name) = cmd.full_name {
            customer.full_name = full_name;
        }
        if let Some(risk_segment) = cmd.risk_segment {
            customer.risk_segment = risk_segment;
        }
        if let Some(status) = cmd.status {
            customer.status = status;
        }
        if let Some(email) = cmd.email {
            customer.email = email;
        }
        if let Some(phone) = cmd.phone {
            customer.phone = phone;
        }

        self.customers.update(&customer).await
    }
}

fn validate_risk_segment(segment: &str) -> Result<()> {
    if matches!(segment, "low" | "medium" | "high") {
        Ok(())
    } else {
        Err(AccountsError::Validation {
            reason: format!("invalid riskSegment: {segment}"),
        })
    }
}
