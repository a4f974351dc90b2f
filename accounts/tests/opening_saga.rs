//! Integration tests for the account-opening saga.

#![allow(clippy::unwrap_used)]

use banca_accounts::config::OpeningBonusConfig;
use banca_accounts::error::AccountsError;
use banca_accounts::mocks::{
    MockAccountStore, MockBalanceStore, MockBonusGrantStore, MockCustomerStore,
    MockLedgerClient, MockLimitsStore,
};
use banca_accounts::providers::{
    AccountStore, BalanceStore, BonusGrantStore, CreateAccount, CreatedAccount, CreditRequest,
    LedgerClient,
};
use banca_accounts::services::{AccountOpeningService, AccountService, OpenAccountCommand};
use banca_accounts::state::{Customer, CustomerId, OpeningBonusGrant};
use banca_core::Currency;
use chrono::Utc;
use rust_decimal::Decimal;

type Accounts =
    AccountService<MockAccountStore, MockCustomerStore, MockBalanceStore, MockLimitsStore>;
type Opening = AccountOpeningService<
    Accounts,
    MockLedgerClient,
    MockBalanceStore,
    MockBonusGrantStore,
    MockAccountStore,
>;

struct Fixture {
    saga: Opening,
    service: Accounts,
    accounts: MockAccountStore,
    balances: MockBalanceStore,
    grants: MockBonusGrantStore,
    ledger: MockLedgerClient,
    customer_id: CustomerId,
}

fn fixture() -> Fixture {
    let accounts = MockAccountStore::new();
    let customers = MockCustomerStore::new();
    let balances = MockBalanceStore::new();
    let limits = MockLimitsStore::new();
    let grants = MockBonusGrantStore::new();
    let ledger = MockLedgerClient::new();

    let customer_id = CustomerId::new();
    customers.seed(Customer {
        id: customer_id,
        full_name: "Carla Uno".to_string(),
        birth_date: "1990-01-01".to_string(),
        tin: "0900000001".to_string(),
        risk_segment: "low".to_string(),
        status: "active".to_string(),
        email: "carla@example.com".to_string(),
        phone: "+593990000001".to_string(),
        created_at: Utc::now(),
    });

    let service = AccountService::new(accounts.clone(), customers, balances.clone(), limits);
    let saga = AccountOpeningService::new(
        service.clone(),
        ledger.clone(),
        balances.clone(),
        grants.clone(),
        accounts.clone(),
        OpeningBonusConfig::default(),
    );

    Fixture {
        saga,
        service,
        accounts,
        balances,
        grants,
        ledger,
        customer_id,
    }
}

fn open_cmd(customer_id: CustomerId, key: Option<&str>) -> OpenAccountCommand {
    OpenAccountCommand {
        customer_id,
        product_type: "checking".to_string(),
        currency: Currency::usd(),
        idempotency_key: key.map(ToString::to_string),
        initiated_by: None,
    }
}

#[tokio::test]
async fn opening_credits_bonus_exactly_once_and_repeats_identically() {
    let fx = fixture();

    let first = fx
        .saga
        .open(open_cmd(fx.customer_id, Some("abc123")))
        .await
        .unwrap();

    assert_eq!(first.status, "opened");
    assert_eq!(first.journal_id.0, "JRN-1");
    assert_eq!(first.account_number.len(), 12);

    let grant = fx
        .grants
        .find_by_key("abc123:opening_bonus")
        .await
        .unwrap()
        .expect("grant stored under caller key + suffix");
    assert_eq!(grant.account_id, first.account_id);
    assert_eq!(grant.amount, Decimal::new(50_00, 2));

    let balance = fx.balances.find(first.account_id).await.unwrap().unwrap();
    assert_eq!(balance.ledger, Decimal::new(50_00, 2));
    assert_eq!(balance.available, Decimal::new(50_00, 2));
    assert_eq!(balance.hold, Decimal::ZERO);

    // Identical retry: same terminal result, no second credit, no
    // second account.
    let second = fx
        .saga
        .open(open_cmd(fx.customer_id, Some("abc123")))
        .await
        .unwrap();
    assert_eq!(second, first);
    assert_eq!(fx.ledger.posting_count(), 1);
    assert_eq!(fx.accounts.len(), 1);

    let balance = fx.balances.find(first.account_id).await.unwrap().unwrap();
    assert_eq!(balance.ledger, Decimal::new(50_00, 2));
}

#[tokio::test]
async fn ledger_failure_aborts_without_saga_state_and_retry_succeeds() {
    let fx = fixture();
    fx.ledger.fail_next(1);

    let err = fx
        .saga
        .open(open_cmd(fx.customer_id, Some("retry-1")))
        .await
        .unwrap_err();
    assert!(matches!(err, AccountsError::ExternalService(_)));

    // No grant claimed, no posting made: the step was not marked
    // complete, so the whole call retries from the top.
    assert!(fx.grants.is_empty());
    assert_eq!(fx.ledger.posting_count(), 0);

    let result = fx
        .saga
        .open(open_cmd(fx.customer_id, Some("retry-1")))
        .await
        .unwrap();
    assert_eq!(fx.ledger.posting_count(), 1);

    let balance = fx.balances.find(result.account_id).await.unwrap().unwrap();
    assert_eq!(balance.available, Decimal::new(50_00, 2));
}

#[tokio::test]
async fn blank_key_derives_a_deterministic_key() {
    let fx = fixture();

    let first = fx.saga.open(open_cmd(fx.customer_id, None)).await.unwrap();
    let second = fx.saga.open(open_cmd(fx.customer_id, None)).await.unwrap();

    assert_eq!(second, first);
    assert_eq!(fx.accounts.len(), 1);
    assert!(
        fx.grants
            .find_by_key(&format!(
                "open:{}:checking:USD:opening_bonus",
                fx.customer_id
            ))
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn unknown_customer_is_rejected() {
    let fx = fixture();
    let err = fx
        .saga
        .open(open_cmd(CustomerId::new(), Some("nobody")))
        .await
        .unwrap_err();
    assert!(matches!(err, AccountsError::CustomerNotFound));
}

/// Account-creation wrapper that lets a concurrent opening with the
/// same idempotency key finish completely (account, posting, grant,
/// local credit) while this call sits between its initial grant lookup
/// and its own insert. The lost-race path, made deterministic.
#[derive(Clone)]
struct RacingCreateAccount {
    inner: Accounts,
    balances: MockBalanceStore,
    grants: MockBonusGrantStore,
    ledger: MockLedgerClient,
    bonus_key: String,
    customer_id: CustomerId,
}

impl CreateAccount for RacingCreateAccount {
    async fn create_account(
        &self,
        customer_id: CustomerId,
        product_type: &str,
        currency: &Currency,
    ) -> banca_accounts::Result<CreatedAccount> {
        let created = self
            .inner
            .create_account(customer_id, product_type, currency)
            .await?;

        // The concurrent request wins the whole opening first.
        let winner = self
            .inner
            .create_account(self.customer_id, product_type, currency)
            .await?;
        let journal = self
            .ledger
            .credit_account(CreditRequest {
                idempotency_key: self.bonus_key.clone(),
                account_id: winner.account_id,
                currency: Currency::usd(),
                amount: Decimal::new(50_00, 2),
                initiated_by: "system".to_string(),
                external_ref: "bonus:registration".to_string(),
                reason: "registration_bonus".to_string(),
                customer_id: self.customer_id,
            })
            .await?;
        let claim = self
            .grants
            .try_insert(OpeningBonusGrant {
                idempotency_key: self.bonus_key.clone(),
                account_id: winner.account_id,
                journal_id: journal,
                amount: Decimal::new(50_00, 2),
                currency: Currency::usd(),
            })
            .await?;
        assert!(claim.is_first());
        self.balances
            .apply_deltas(
                winner.account_id,
                Decimal::new(50_00, 2),
                Decimal::new(50_00, 2),
                Decimal::ZERO,
            )
            .await?;

        Ok(created)
    }
}

#[tokio::test]
async fn losing_the_grant_race_returns_the_winner_without_a_second_credit() {
    let fx = fixture();
    let bonus_key = "raced:opening_bonus".to_string();

    let racing = RacingCreateAccount {
        inner: fx.service.clone(),
        balances: fx.balances.clone(),
        grants: fx.grants.clone(),
        ledger: fx.ledger.clone(),
        bonus_key: bonus_key.clone(),
        customer_id: fx.customer_id,
    };
    let saga = AccountOpeningService::new(
        racing,
        fx.ledger.clone(),
        fx.balances.clone(),
        fx.grants.clone(),
        fx.accounts.clone(),
        OpeningBonusConfig::default(),
    );

    let result = saga
        .open(open_cmd(fx.customer_id, Some("raced")))
        .await
        .unwrap();

    let winner = fx
        .grants
        .find_by_key(&bonus_key)
        .await
        .unwrap()
        .expect("winner's grant on file");

    // The loser reports the winner's account and journal.
    assert_eq!(result.account_id, winner.account_id);
    assert_eq!(result.journal_id, winner.journal_id);

    // One posting, one local credit, on the winner's account only.
    assert_eq!(fx.ledger.posting_count(), 1);
    let winner_balance = fx.balances.find(winner.account_id).await.unwrap().unwrap();
    assert_eq!(winner_balance.ledger, Decimal::new(50_00, 2));

    // Both racing calls created an account (the documented ambiguity),
    // but the loser's account got no credit.
    assert_eq!(fx.accounts.len(), 2);
    for account in fx.accounts.find_by_customer(fx.customer_id).await.unwrap() {
        if account.id != winner.account_id {
            let balance = fx.balances.find(account.id).await.unwrap().unwrap();
            assert_eq!(balance.ledger, Decimal::ZERO);
        }
    }
}
