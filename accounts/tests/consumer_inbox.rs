//! Integration tests for the ledger-posted consumer and event inbox.

#![allow(clippy::unwrap_used)]

use banca_accounts::config::ConsumerConfig;
use banca_accounts::consumer::LedgerPostedConsumer;
use banca_accounts::mocks::{MockBalanceStore, MockEventTransport, MockInboxStore};
use banca_accounts::providers::{BalanceStore, InboxStore};
use banca_accounts::state::{AccountId, Balance, InboxStatus};
use rust_decimal::Decimal;
use serde_json::json;

type Consumer = LedgerPostedConsumer<MockEventTransport, MockInboxStore, MockBalanceStore>;

struct Fixture {
    consumer: Consumer,
    transport: MockEventTransport,
    inbox: MockInboxStore,
    balances: MockBalanceStore,
    account_id: AccountId,
}

fn fixture() -> Fixture {
    let transport = MockEventTransport::new();
    let inbox = MockInboxStore::new();
    let balances = MockBalanceStore::new();
    let account_id = AccountId::new();
    balances.seed(Balance::zero(account_id));

    let consumer = LedgerPostedConsumer::new(
        transport.clone(),
        inbox.clone(),
        balances.clone(),
        ConsumerConfig::default(),
    );

    Fixture {
        consumer,
        transport,
        inbox,
        balances,
        account_id,
    }
}

fn posted_body(event_id: &str, account_id: AccountId, amount: &str) -> String {
    json!({
        "id": "bus-id",
        "detail": {
            "event_id": event_id,
            "postings": [{
                "account_id": account_id.0,
                "d_ledger": amount,
                "d_available": amount,
                "d_hold": "0",
            }],
        },
    })
    .to_string()
}

#[tokio::test]
async fn duplicate_delivery_applies_postings_exactly_once() {
    let fx = fixture();
    fx.transport
        .push(posted_body("evt-1", fx.account_id, "25.00"));
    fx.transport
        .push(posted_body("evt-1", fx.account_id, "25.00"));

    let applied = fx.consumer.poll_once().await.unwrap();
    assert_eq!(applied, 1);

    // Both deliveries acknowledged: the duplicate without reapplying.
    assert_eq!(fx.transport.pending(), 0);

    let balance = fx.balances.find(fx.account_id).await.unwrap().unwrap();
    assert_eq!(balance.ledger, Decimal::new(25_00, 2));

    let row = fx.inbox.find("evt-1").await.unwrap().unwrap();
    assert_eq!(row.status, InboxStatus::Processed);
    assert!(row.processed_at.is_some());

    // A later redelivery is also a no-op.
    fx.transport
        .push(posted_body("evt-1", fx.account_id, "25.00"));
    let applied = fx.consumer.poll_once().await.unwrap();
    assert_eq!(applied, 0);
    let balance = fx.balances.find(fx.account_id).await.unwrap().unwrap();
    assert_eq!(balance.ledger, Decimal::new(25_00, 2));
}

#[tokio::test]
async fn failed_message_is_left_for_redelivery_and_retries_cleanly() {
    let fx = fixture();
    let unknown = AccountId::new();
    fx.transport.push(posted_body("evt-2", unknown, "10.00"));

    let applied = fx.consumer.poll_once().await.unwrap();
    assert_eq!(applied, 0);

    // Not acknowledged; failure recorded; row stays retryable.
    assert_eq!(fx.transport.pending(), 1);
    let row = fx.inbox.find("evt-2").await.unwrap().unwrap();
    assert_eq!(row.status, InboxStatus::Failed);
    assert!(row.error.is_some());

    // Once the account exists, the redelivered message processes.
    fx.balances.seed(Balance::zero(unknown));
    let applied = fx.consumer.poll_once().await.unwrap();
    assert_eq!(applied, 1);
    assert_eq!(fx.transport.pending(), 0);
    assert_eq!(
        fx.inbox.find("evt-2").await.unwrap().unwrap().status,
        InboxStatus::Processed
    );
    let balance = fx.balances.find(unknown).await.unwrap().unwrap();
    assert_eq!(balance.ledger, Decimal::new(10_00, 2));
}

#[tokio::test]
async fn multi_posting_event_applies_all_or_nothing() {
    let fx = fixture();
    let missing = AccountId::new();
    let body = json!({
        "id": "evt-3",
        "detail": {
            "postings": [
                {
                    "account_id": fx.account_id.0,
                    "d_ledger": "5.00",
                    "d_available": "5.00",
                    "d_hold": "0",
                },
                {
                    "account_id": missing.0,
                    "d_ledger": "5.00",
                    "d_available": "5.00",
                    "d_hold": "0",
                },
            ],
        },
    })
    .to_string();
    fx.transport.push(body);

    let applied = fx.consumer.poll_once().await.unwrap();
    assert_eq!(applied, 0);

    // The first posting must not stick when the second fails.
    let balance = fx.balances.find(fx.account_id).await.unwrap().unwrap();
    assert_eq!(balance.ledger, Decimal::ZERO);
    assert_eq!(fx.transport.pending(), 1);
}

#[tokio::test]
async fn blank_event_id_processes_without_dedup() {
    let fx = fixture();
    let body = json!({
        "detail": {
            "postings": [{
                "account_id": fx.account_id.0,
                "d_ledger": "1.00",
                "d_available": "1.00",
                "d_hold": "0",
            }],
        },
    })
    .to_string();

    fx.transport.push(body.clone());
    fx.consumer.poll_once().await.unwrap();
    fx.transport.push(body);
    fx.consumer.poll_once().await.unwrap();

    // No id, no dedup: both deliveries apply (the documented risk).
    let balance = fx.balances.find(fx.account_id).await.unwrap().unwrap();
    assert_eq!(balance.ledger, Decimal::new(2_00, 2));
    assert!(fx.inbox.is_empty());
}

#[tokio::test]
async fn notification_envelope_bodies_are_unwrapped() {
    let fx = fixture();
    let bus_event = posted_body("evt-4", fx.account_id, "7.00");
    fx.transport.push(
        json!({ "Type": "Notification", "Message": bus_event }).to_string(),
    );

    let applied = fx.consumer.poll_once().await.unwrap();
    assert_eq!(applied, 1);
    let balance = fx.balances.find(fx.account_id).await.unwrap().unwrap();
    assert_eq!(balance.ledger, Decimal::new(7_00, 2));
    assert_eq!(
        fx.inbox.find("evt-4").await.unwrap().unwrap().status,
        InboxStatus::Processed
    );
}

#[tokio::test]
async fn undecodable_bodies_fail_without_acknowledgement() {
    let fx = fixture();
    fx.transport.push("not json at all");

    let applied = fx.consumer.poll_once().await.unwrap();
    assert_eq!(applied, 0);
    assert_eq!(fx.transport.pending(), 1);
}

#[tokio::test]
async fn stuck_received_row_is_retried_after_crash() {
    let fx = fixture();

    // Simulate a crash after try_begin: the row exists as `received`
    // but the message was never acknowledged.
    assert!(fx.inbox.try_begin("evt-5", "ledger.journal.posted").await.unwrap());
    fx.transport
        .push(posted_body("evt-5", fx.account_id, "3.00"));

    let applied = fx.consumer.poll_once().await.unwrap();
    assert_eq!(applied, 1);
    assert_eq!(
        fx.inbox.find("evt-5").await.unwrap().unwrap().status,
        InboxStatus::Processed
    );
}
