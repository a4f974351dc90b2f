//! Integration tests for the registration activation saga.

#![allow(clippy::unwrap_used)]

use banca_identity::config::ActivationConfig;
use banca_identity::error::IdentityError;
use banca_identity::mocks::{
    MockAccountsClient, MockCustomersClient, MockLedgerClient, MockRegistrationStore,
};
use banca_identity::providers::RegistrationStore;
use banca_identity::services::{
    ActivateCommand, ActivationService, OnboardingService, StartRegistrationCommand,
};
use banca_identity::state::{RegistrationId, RegistrationState};

type Activation = ActivationService<
    MockRegistrationStore,
    MockCustomersClient,
    MockAccountsClient,
    MockLedgerClient,
>;

struct Fixture {
    onboarding: OnboardingService<MockRegistrationStore>,
    saga: Activation,
    registrations: MockRegistrationStore,
    customers: MockCustomersClient,
    accounts: MockAccountsClient,
    ledger: MockLedgerClient,
}

fn fixture() -> Fixture {
    let registrations = MockRegistrationStore::new();
    let customers = MockCustomersClient::new();
    let accounts = MockAccountsClient::new();
    let ledger = MockLedgerClient::new();

    Fixture {
        onboarding: OnboardingService::new(registrations.clone()),
        saga: ActivationService::new(
            registrations.clone(),
            customers.clone(),
            accounts.clone(),
            ledger.clone(),
            ActivationConfig::default(),
        ),
        registrations,
        customers,
        accounts,
        ledger,
    }
}

async fn kyc_confirmed_registration(fx: &Fixture) -> RegistrationId {
    let intent = fx
        .onboarding
        .start(StartRegistrationCommand {
            email: "maria@example.com".to_string(),
            phone: "+593990000003".to_string(),
            channel: "mobile".to_string(),
        })
        .await
        .unwrap();
    fx.onboarding.confirm_kyc(intent.id).await.unwrap();
    intent.id
}

fn activate_cmd(id: RegistrationId) -> ActivateCommand {
    ActivateCommand {
        registration_id: id,
        full_name: "Maria Tres".to_string(),
        birth_date: "1992-03-03".to_string(),
        tin: "0900000003".to_string(),
    }
}

#[tokio::test]
async fn activation_completes_all_steps_and_is_idempotent() {
    let fx = fixture();
    let id = kyc_confirmed_registration(&fx).await;

    let result = fx.saga.activate(activate_cmd(id)).await.unwrap();

    assert_eq!(result.state, RegistrationState::Activated);
    assert_eq!(result.activation_ref, format!("act-{id}"));
    assert_eq!(result.customer_id, "CUS-1");
    assert_eq!(result.primary_account_id, "ACC-1");
    assert_eq!(result.bonus_journal_id, "JRN-1");

    // Sub-step keys derive from the activation reference.
    assert_eq!(fx.customers.attempts(), vec![format!("act-{id}")]);
    assert_eq!(
        fx.accounts.attempts(),
        vec![format!("act-{id}:primary_account")]
    );
    assert_eq!(
        fx.ledger.attempts(),
        vec![format!("act-{id}:opening_bonus")]
    );

    // Repeat call: cached terminal result, no capability re-invoked.
    let again = fx.saga.activate(activate_cmd(id)).await.unwrap();
    assert_eq!(again, result);
    assert_eq!(fx.customers.created_count(), 1);
    assert_eq!(fx.customers.attempts().len(), 1);
    assert_eq!(fx.accounts.attempts().len(), 1);
    assert_eq!(fx.ledger.attempts().len(), 1);
}

#[tokio::test]
async fn activation_resumes_after_partial_failure_without_repeating_steps() {
    let fx = fixture();
    let id = kyc_confirmed_registration(&fx).await;

    // Customer creation succeeds, account creation dies mid-saga.
    fx.accounts.fail_next(1);
    let err = fx.saga.activate(activate_cmd(id)).await.unwrap_err();
    assert!(matches!(err, IdentityError::ExternalService(_)));

    // The completed sub-step is persisted; the failed one is not.
    let stored = fx.registrations.find(id).await.unwrap().unwrap();
    assert_eq!(stored.state, RegistrationState::Activating);
    assert_eq!(stored.customer_id.as_deref(), Some("CUS-1"));
    assert!(stored.primary_account_id.is_none());
    assert!(stored.bonus_journal_id.is_none());

    // Retry resumes at the account sub-step: customer creation is
    // never re-invoked.
    let result = fx.saga.activate(activate_cmd(id)).await.unwrap();
    assert_eq!(result.customer_id, "CUS-1");
    assert_eq!(result.state, RegistrationState::Activated);
    assert_eq!(fx.customers.attempts().len(), 1);
    assert_eq!(fx.accounts.attempts().len(), 2);
    assert_eq!(fx.accounts.created_count(), 1);
    assert_eq!(fx.ledger.attempts().len(), 1);
}

#[tokio::test]
async fn activation_resumes_after_bonus_failure() {
    let fx = fixture();
    let id = kyc_confirmed_registration(&fx).await;

    fx.ledger.fail_next(1);
    fx.saga.activate(activate_cmd(id)).await.unwrap_err();

    let stored = fx.registrations.find(id).await.unwrap().unwrap();
    assert_eq!(stored.customer_id.as_deref(), Some("CUS-1"));
    assert_eq!(stored.primary_account_id.as_deref(), Some("ACC-1"));
    assert!(stored.bonus_journal_id.is_none());
    assert!(stored.activated_at.is_none());

    let result = fx.saga.activate(activate_cmd(id)).await.unwrap();
    assert_eq!(result.bonus_journal_id, "JRN-1");
    assert_eq!(fx.customers.attempts().len(), 1);
    assert_eq!(fx.accounts.attempts().len(), 1);
    assert_eq!(fx.ledger.attempts().len(), 2);
    assert_eq!(fx.ledger.posting_count(), 1);
}

#[tokio::test]
async fn activation_requires_kyc_confirmation() {
    let fx = fixture();
    let intent = fx
        .onboarding
        .start(StartRegistrationCommand {
            email: "nokyc@example.com".to_string(),
            phone: "+593990000004".to_string(),
            channel: "web".to_string(),
        })
        .await
        .unwrap();

    let err = fx.saga.activate(activate_cmd(intent.id)).await.unwrap_err();
    assert!(matches!(
        err,
        IdentityError::InvalidRegistrationState {
            state: RegistrationState::Started
        }
    ));
    assert_eq!(fx.customers.attempts().len(), 0);
}

#[tokio::test]
async fn rejected_registrations_cannot_activate() {
    let fx = fixture();
    let id = kyc_confirmed_registration(&fx).await;
    fx.onboarding.reject(id).await.unwrap();

    let err = fx.saga.activate(activate_cmd(id)).await.unwrap_err();
    assert!(matches!(
        err,
        IdentityError::InvalidRegistrationState {
            state: RegistrationState::Rejected
        }
    ));
}

#[tokio::test]
async fn unknown_registration_is_not_found() {
    let fx = fixture();
    let err = fx
        .saga
        .activate(activate_cmd(RegistrationId::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::RegistrationNotFound(_)));
}

#[tokio::test]
async fn kyc_and_rejection_transitions_are_gated() {
    let fx = fixture();
    let id = kyc_confirmed_registration(&fx).await;

    // KYC cannot be confirmed twice.
    let err = fx.onboarding.confirm_kyc(id).await.unwrap_err();
    assert!(matches!(
        err,
        IdentityError::InvalidRegistrationState {
            state: RegistrationState::KycConfirmed
        }
    ));

    // Once activated, rejection is no longer possible.
    fx.saga.activate(activate_cmd(id)).await.unwrap();
    let err = fx.onboarding.reject(id).await.unwrap_err();
    assert!(matches!(
        err,
        IdentityError::InvalidRegistrationState {
            state: RegistrationState::Activated
        }
    ));
}

#[tokio::test]
async fn interrupted_activating_registration_resumes_on_next_call() {
    let fx = fixture();
    let id = kyc_confirmed_registration(&fx).await;

    // Simulate a crash right after the saga pinned its reference and
    // state, before any external call completed.
    let mut stored = fx.registrations.find(id).await.unwrap().unwrap();
    stored.state = RegistrationState::Activating;
    stored.activation_ref = Some(format!("act-{id}"));
    fx.registrations.update(&stored).await.unwrap();

    let result = fx.saga.activate(activate_cmd(id)).await.unwrap();
    assert_eq!(result.state, RegistrationState::Activated);
    // The pinned reference was reused, not regenerated.
    assert_eq!(result.activation_ref, format!("act-{id}"));
    assert_eq!(fx.customers.attempts(), vec![format!("act-{id}")]);
}
