//! Balance invariant tests: `available` never goes negative, holds
//! always reconcile, and concurrent reservations never over-commit.

#![allow(clippy::unwrap_used)]

use banca_accounts::error::AccountsError;
use banca_accounts::mocks::MockBalanceStore;
use banca_accounts::providers::BalanceStore;
use banca_accounts::state::{AccountId, Balance};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn seeded(available: Decimal) -> (MockBalanceStore, AccountId) {
    let store = MockBalanceStore::new();
    let account_id = AccountId::new();
    store.seed(Balance {
        account_id,
        ledger: available,
        available,
        hold: Decimal::ZERO,
    });
    (store, account_id)
}

#[tokio::test]
async fn reserve_and_release_keep_the_books_consistent() {
    let (store, account_id) = seeded(Decimal::new(100_00, 2));

    let hold = store
        .reserve_hold(account_id, Decimal::new(30_00, 2))
        .await
        .unwrap();
    assert_eq!(hold, Decimal::new(30_00, 2));

    let hold = store
        .release_hold(account_id, Decimal::new(10_00, 2))
        .await
        .unwrap();
    assert_eq!(hold, Decimal::new(20_00, 2));

    // Release beyond the outstanding hold is a logic error and changes
    // nothing.
    let err = store
        .release_hold(account_id, Decimal::new(30_00, 2))
        .await
        .unwrap_err();
    assert!(matches!(err, AccountsError::InvalidHoldState { .. }));

    // Reserve beyond available fails and changes nothing.
    let err = store
        .reserve_hold(account_id, Decimal::new(90_00, 2))
        .await
        .unwrap_err();
    assert!(matches!(err, AccountsError::InsufficientFunds { .. }));

    let balance = store.find(account_id).await.unwrap().unwrap();
    assert_eq!(balance.available, Decimal::new(80_00, 2));
    assert_eq!(balance.hold, Decimal::new(20_00, 2));
    assert_eq!(balance.available + balance.hold, Decimal::new(100_00, 2));
    assert_eq!(balance.ledger, Decimal::new(100_00, 2));
}

#[tokio::test]
async fn missing_account_is_not_found() {
    let store = MockBalanceStore::new();
    let err = store
        .reserve_hold(AccountId::new(), Decimal::ONE)
        .await
        .unwrap_err();
    assert!(matches!(err, AccountsError::BalanceNotFound(_)));
}

#[tokio::test]
async fn double_init_is_already_exists() {
    let store = MockBalanceStore::new();
    let account_id = AccountId::new();
    store.init_zero(account_id).await.unwrap();
    let err = store.init_zero(account_id).await.unwrap_err();
    assert!(matches!(err, AccountsError::AlreadyExists { .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_reservations_succeed_for_exactly_the_funded_count() {
    // available = amount * k; more than k concurrent reservations of
    // `amount` must succeed exactly k times regardless of arrival
    // order.
    let amount = Decimal::new(10_00, 2);
    let k: usize = 5;
    let attempts: usize = 20;
    let (store, account_id) = seeded(amount * Decimal::from(k as u32));

    let mut handles = Vec::with_capacity(attempts);
    for _ in 0..attempts {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.reserve_hold(account_id, amount).await.is_ok()
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap() {
            successes += 1;
        }
    }

    assert_eq!(successes, k);
    let balance = store.find(account_id).await.unwrap().unwrap();
    assert_eq!(balance.available, Decimal::ZERO);
    assert_eq!(balance.hold, amount * Decimal::from(k as u32));
}

#[derive(Debug, Clone)]
enum Op {
    Reserve(u32),
    Release(u32),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u32..=60).prop_map(Op::Reserve),
        (1u32..=60).prop_map(Op::Release),
    ]
}

proptest! {
    /// For any sequence of reserves and releases, `available` never
    /// goes negative and `available + hold` always equals the starting
    /// value implied by the completed operations.
    #[test]
    fn any_sequence_of_holds_preserves_the_invariant(
        ops in proptest::collection::vec(op_strategy(), 1..40)
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        rt.block_on(async move {
            let start = Decimal::new(100, 0);
            let (store, account_id) = seeded(start);
            let mut expected_hold = Decimal::ZERO;

            for op in ops {
                match op {
                    Op::Reserve(n) => {
                        let amount = Decimal::from(n);
                        if store.reserve_hold(account_id, amount).await.is_ok() {
                            expected_hold += amount;
                        }
                    }
                    Op::Release(n) => {
                        let amount = Decimal::from(n);
                        if store.release_hold(account_id, amount).await.is_ok() {
                            expected_hold -= amount;
                        }
                    }
                }

                let balance = store.find(account_id).await.unwrap().unwrap();
                prop_assert!(balance.available >= Decimal::ZERO);
                prop_assert!(balance.hold >= Decimal::ZERO);
                prop_assert_eq!(balance.hold, expected_hold);
                prop_assert_eq!(balance.available + balance.hold, start);
            }
            Ok(())
        })?;
    }
}
