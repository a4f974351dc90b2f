//! Registration activation: customer → account → bonus.
//!
//! A multi-step saga coordinated without a distributed transaction.
//! Each sub-step calls one external capability with an idempotency key
//! derived from the registration's stable activation reference, and its
//! output is persisted the instant it is obtained, so a crash after
//! any sub-step resumes at the next incomplete one on the following
//! call, and no sub-step is ever repeated once its output exists.
//! There is no compensating rollback: a failed call relies on the next
//! retry to resume, never to undo.

use crate::config::ActivationConfig;
use crate::error::{IdentityError, Result};
use crate::providers::{
    AccountsClient, CustomerProfile, CustomersClient, LedgerClient, RegistrationStore,
};
use crate::state::{ActivationResult, RegistrationId, RegistrationIntent, RegistrationState};
use banca_core::{Clock, SystemClock};
use tracing::{debug, info};

/// Suffix on the activation reference for the account sub-step's key.
const ACCOUNT_KEY_SUFFIX: &str = ":primary_account";
/// Suffix on the activation reference for the bonus sub-step's key.
const BONUS_KEY_SUFFIX: &str = ":opening_bonus";

/// Input to [`ActivationService::activate`].
#[derive(Debug, Clone)]
pub struct ActivateCommand {
    /// Registration to activate.
    pub registration_id: RegistrationId,
    /// Legal name forwarded to customer creation.
    pub full_name: String,
    /// Date of birth (ISO date string).
    pub birth_date: String,
    /// Tax identification number.
    pub tin: String,
}

/// Drives a registration from `KYC_CONFIRMED` to `ACTIVATED`.
#[derive(Debug, Clone)]
pub struct ActivationService<R, C, A, L, K = SystemClock> {
    registrations: R,
    customers: C,
    accounts: A,
    ledger: L,
    clock: K,
    config: ActivationConfig,
}

impl<R, C, A, L> ActivationService<R, C, A, L>
where
    R: RegistrationStore,
    C: CustomersClient,
    A: AccountsClient,
    L: LedgerClient,
{
    /// Create the saga on the system clock.
    pub const fn new(
        registrations: R,
        customers: C,
        accounts: A,
        ledger: L,
        config: ActivationConfig,
    ) -> Self {
        Self {
            registrations,
            customers,
            accounts,
            ledger,
            clock: SystemClock,
            config,
        }
    }
}

impl<R, C, A, L, K> ActivationService<R, C, A, L, K>
where
    R: RegistrationStore,
    C: CustomersClient,
    A: AccountsClient,
    L: LedgerClient,
    K: Clock,
{
    /// Create the saga on a caller-supplied clock.
    pub const fn with_clock(
        registrations: R,
        customers: C,
        accounts: A,
        ledger: L,
        clock: K,
        config: ActivationConfig,
    ) -> Self {
        Self {
            registrations,
            customers,
            accounts,
            ledger,
            clock,
            config,
        }
    }

    /// Activate a registration. Callable repeatedly: an `ACTIVATED`
    /// registration returns its recorded result immediately, an
    /// `ACTIVATING` one resumes at its first incomplete sub-step.
    ///
    /// # Errors
    ///
    /// - [`RegistrationNotFound`](IdentityError::RegistrationNotFound)
    ///   for an unknown id
    /// - [`InvalidRegistrationState`](IdentityError::InvalidRegistrationState)
    ///   unless the registration is `KYC_CONFIRMED`, `ACTIVATING`, or
    ///   already `ACTIVATED`
    /// - [`ExternalService`](IdentityError::ExternalService) when a
    ///   capability fails; every completed sub-step stays persisted and
    ///   the call is safe to retry
    pub async fn activate(&self, cmd: ActivateCommand) -> Result<ActivationResult> {
        let id = cmd.registration_id;
        let mut intent = self.load(id).await?;

        match intent.state {
            RegistrationState::Activated => {
                debug!(registration_id = %id, "already activated; returning recorded result");
                return result_from(&intent);
            }
            RegistrationState::KycConfirmed | RegistrationState::Activating => {}
            state => {
                return Err(IdentityError::InvalidRegistrationState { state });
            }
        }

        // First entry: pin the stable activation reference and mark the
        // saga in flight before any external call.
        if intent.activation_ref.is_none() {
            intent.activation_ref = Some(format!("act-{id}"));
            intent.state = RegistrationState::Activating;
            intent.updated_at = self.clock.now();
            self.registrations.update(&intent).await?;
        } else if intent.state == RegistrationState::KycConfirmed {
            intent.state = RegistrationState::Activating;
            intent.updated_at = self.clock.now();
            self.registrations.update(&intent).await?;
        }

        let activation_ref = intent
            .activation_ref
            .clone()
            .ok_or_else(|| IdentityError::Internal("activation_ref vanished".to_string()))?;

        // Sub-step 1: customer. Re-read first; another worker (or an
        // earlier crashed attempt) may already have persisted the
        // output.
        intent = self.load(id).await?;
        if intent.customer_id.is_none() {
            let profile = CustomerProfile {
                full_name: cmd.full_name.clone(),
                birth_date: cmd.birth_date.clone(),
                tin: cmd.tin.clone(),
                email: intent.email.clone(),
                phone: intent.phone.clone(),
            };
            let customer_id = self
                .customers
                .create_customer(&activation_ref, &id.to_string(), &profile)
                .await?;
            intent.customer_id = Some(customer_id);
            intent.updated_at = self.clock.now();
            self.registrations.update(&intent).await?;
            debug!(registration_id = %id, "customer persisted");
        }

        // Sub-step 2: primary account.
        intent = self.load(id).await?;
        if intent.primary_account_id.is_none() {
            let customer_id = required(&intent.customer_id, "customer_id")?;
            let account_id = self
                .accounts
                .create_account(
                    &format!("{activation_ref}{ACCOUNT_KEY_SUFFIX}"),
                    &id.to_string(),
                    customer_id,
                    &self.config.product_type,
                    &self.config.currency,
                )
                .await?;
            intent.primary_account_id = Some(account_id);
            intent.updated_at = self.clock.now();
            self.registrations.update(&intent).await?;
            debug!(registration_id = %id, "primary account persisted");
        }

        // Sub-step 3: opening bonus.
        intent = self.load(id).await?;
        if intent.bonus_journal_id.is_none() {
            let customer_id = required(&intent.customer_id, "customer_id")?.to_string();
            let account_id = required(&intent.primary_account_id, "primary_account_id")?;
            let journal_id = self
                .ledger
                .credit_account(
                    &format!("{activation_ref}{BONUS_KEY_SUFFIX}"),
                    account_id,
                    &self.config.currency,
                    self.config.bonus_amount,
                    &self.config.initiated_by,
                    &self.config.bonus_external_ref,
                    &self.config.bonus_reason,
                    &customer_id,
                )
                .await?;
            intent.bonus_journal_id = Some(journal_id);
            intent.updated_at = self.clock.now();
            self.registrations.update(&intent).await?;
            debug!(registration_id = %id, "bonus journal persisted");
        }

        // All three outputs exist: terminal transition.
        let now = self.clock.now();
        intent.state = RegistrationState::Activated;
        intent.activated_at = Some(now);
        intent.updated_at = now;
        self.registrations.update(&intent).await?;

        info!(registration_id = %id, activation_ref = %activation_ref, "registration activated");
        result_from(&intent)
    }

    async fn load(&self, id: RegistrationId) -> Result<RegistrationIntent> {
        self.registrations
            .find(id)
            .await?
            .ok_or(IdentityError::RegistrationNotFound(id))
    }
}

fn required<'a>(field: &'a Option<String>, name: &str) -> Result<&'a str> {
    field
        .as_deref()
        .ok_or_else(|| IdentityError::Internal(format!("{name} unset after its sub-step")))
}

fn result_from(intent: &RegistrationIntent) -> Result<ActivationResult> {
    Ok(ActivationResult {
        registration_id: intent.id,
        state: intent.state,
        customer_id: required(&intent.customer_id, "customer_id")?.to_string(),
        primary_account_id: required(&intent.primary_account_id, "primary_account_id")?
            .to_string(),
        activation_ref: intent
            .activation_ref
            .clone()
            .ok_or_else(|| IdentityError::Internal("activation_ref unset".to_string()))?,
        bonus_journal_id: required(&intent.bonus_journal_id, "bonus_journal_id")?.to_string(),
        activated_at: intent
            .activated_at
            .ok_or_else(|| IdentityError::Internal("activated_at unset".to_string()))?,
    })
}
