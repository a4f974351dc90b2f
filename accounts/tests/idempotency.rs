//! Integration tests for the idempotency guard and guarded customer
//! creation.

#![allow(clippy::unwrap_used)]

use banca_accounts::mocks::{MockCustomerStore, MockIdempotencyStore};
use banca_accounts::services::{CreateCustomerCommand, CustomerService, IdempotencyGuard};
use banca_accounts::state::CustomerId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Reply {
    value: String,
}

#[tokio::test]
async fn cached_response_is_returned_only_for_the_matching_operation() {
    let guard = IdempotencyGuard::new(MockIdempotencyStore::new());
    let reply = Reply {
        value: "done".to_string(),
    };

    assert!(guard.try_get::<Reply>("key-1", "op_a").await.unwrap().is_none());
    guard.save("key-1", "op_a", 200, &reply).await.unwrap();

    assert_eq!(
        guard.try_get::<Reply>("key-1", "op_a").await.unwrap(),
        Some(reply)
    );
    // Same key, different operation: no match.
    assert!(guard.try_get::<Reply>("key-1", "op_b").await.unwrap().is_none());
}

#[tokio::test]
async fn blank_keys_never_deduplicate() {
    let store = MockIdempotencyStore::new();
    let guard = IdempotencyGuard::new(store.clone());
    let reply = Reply {
        value: "x".to_string(),
    };

    guard.save("", "op", 200, &reply).await.unwrap();
    guard.save("   ", "op", 200, &reply).await.unwrap();
    assert!(store.is_empty());
    assert!(guard.try_get::<Reply>("", "op").await.unwrap().is_none());
}

#[tokio::test]
async fn first_save_wins() {
    let guard = IdempotencyGuard::new(MockIdempotencyStore::new());
    guard
        .save("key-2", "op", 200, &Reply { value: "first".to_string() })
        .await
        .unwrap();
    guard
        .save("key-2", "op", 200, &Reply { value: "second".to_string() })
        .await
        .unwrap();

    let cached = guard.try_get::<Reply>("key-2", "op").await.unwrap().unwrap();
    assert_eq!(cached.value, "first");
}

#[tokio::test]
async fn undecodable_cached_payload_reads_as_a_miss() {
    let guard = IdempotencyGuard::new(MockIdempotencyStore::new());
    guard.save("key-3", "op", 200, &"just a string").await.unwrap();

    // The payload is a string, not a Reply: miss rather than error.
    assert!(guard.try_get::<Reply>("key-3", "op").await.unwrap().is_none());
}

#[tokio::test]
async fn customer_creation_is_deduplicated_by_key() {
    let customers = MockCustomerStore::new();
    let service = CustomerService::new(customers.clone(), MockIdempotencyStore::new());

    let cmd = CreateCustomerCommand {
        full_name: "Ana Dos".to_string(),
        birth_date: "1985-05-05".to_string(),
        tin: "0900000002".to_string(),
        risk_segment: None,
        email: "ana@example.com".to_string(),
        phone: "+593990000002".to_string(),
    };

    let first = service.create_customer("reg-1", cmd.clone()).await.unwrap();
    let retried = service.create_customer("reg-1", cmd.clone()).await.unwrap();
    assert_eq!(first, retried);
    assert_eq!(customers.len(), 1);

    // A different key is a different logical request.
    let other: CustomerId = service.create_customer("reg-2", cmd).await.unwrap();
    assert_ne!(other, first);
    assert_eq!(customers.len(), 2);
}
