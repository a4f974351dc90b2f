//! Registration lifecycle up to (and out of) activation eligibility.

use crate::error::{IdentityError, Result};
use crate::providers::RegistrationStore;
use crate::state::{RegistrationId, RegistrationIntent, RegistrationState};
use banca_core::{Clock, SystemClock};
use tracing::info;

/// Input to [`OnboardingService::start`].
#[derive(Debug, Clone)]
pub struct StartRegistrationCommand {
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// Acquisition channel.
    pub channel: String,
}

/// Creates registrations and drives the pre-activation transitions.
#[derive(Debug, Clone)]
pub struct OnboardingService<R, K = SystemClock> {
    registrations: R,
    clock: K,
}

impl<R: RegistrationStore> OnboardingService<R> {
    /// Create the service on the system clock.
    pub const fn new(registrations: R) -> Self {
        Self {
            registrations,
            clock: SystemClock,
        }
    }
}

impl<R, K> OnboardingService<R, K>
where
    R: RegistrationStore,
    K: Clock,
{
    /// Create the service on a caller-supplied clock.
    pub const fn with_clock(registrations: R, clock: K) -> Self {
        Self {
            registrations,
            clock,
        }
    }

    /// Start a registration in `STARTED`.
    ///
    /// # Errors
    ///
    /// Returns error on storage failure.
    pub async fn start(&self, cmd: StartRegistrationCommand) -> Result<RegistrationIntent> {
        let intent = RegistrationIntent::started(
            RegistrationId::new(),
            cmd.email,
            cmd.phone,
            cmd.channel,
            self.clock.now(),
        );
        self.registrations.insert(&intent).await?;
        info!(registration_id = %intent.id, "registration started");
        Ok(intent)
    }

    /// Confirm KYC: `STARTED` → `KYC_CONFIRMED`.
    ///
    /// # Errors
    ///
    /// Returns
    /// [`InvalidRegistrationState`](IdentityError::InvalidRegistrationState)
    /// unless the registration is `STARTED`.
    pub async fn confirm_kyc(&self, id: RegistrationId) -> Result<RegistrationIntent> {
        self.transition(id, RegistrationState::KycConfirmed, &[RegistrationState::Started])
            .await
    }

    /// Reject: `STARTED`/`KYC_CONFIRMED` → `REJECTED` (terminal).
    ///
    /// # Errors
    ///
    /// Returns
    /// [`InvalidRegistrationState`](IdentityError::InvalidRegistrationState)
    /// unless the registration is `STARTED` or `KYC_CONFIRMED`.
    pub async fn reject(&self, id: RegistrationId) -> Result<RegistrationIntent> {
        self.transition(
            id,
            RegistrationState::Rejected,
            &[RegistrationState::Started, RegistrationState::KycConfirmed],
        )
        .await
    }

    async fn transition(
        &self,
        id: RegistrationId,
        to: RegistrationState,
        allowed_from: &[RegistrationState],
    ) -> Result<RegistrationIntent> {
        let mut intent = self
            .registrations
            .find(id)
            .await?
            .ok_or(IdentityError::RegistrationNotFound(id))?;

        if !allowed_from.contains(&intent.state) {
            return Err(IdentityError::InvalidRegistrationState {
                state: intent.state,
            });
        }

        intent.state = to;
        intent.updated_at = self.clock.now();
        self.registrations.update(&intent).await?;
        info!(registration_id = %id, state = ?to, "registration transitioned");
        Ok(intent)
    }
}
