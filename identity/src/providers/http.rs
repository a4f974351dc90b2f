//! HTTP implementations of the capability ports.
//!
//! Thin adapters: the idempotency key travels as the `idempotency-key`
//! header, bodies are JSON. Validation, auth, and routing live behind
//! the remote endpoints.

use crate::error::{IdentityError, Result};
use crate::providers::{AccountsClient, CustomerProfile, CustomersClient, LedgerClient};
use banca_core::Currency;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

async fn post_json<T: for<'de> Deserialize<'de>>(
    client: &reqwest::Client,
    url: &str,
    idempotency_key: &str,
    body: &impl Serialize,
    capability: &str,
) -> Result<T> {
    let response = client
        .post(url)
        .header("idempotency-key", idempotency_key)
        .json(body)
        .send()
        .await
        .map_err(|e| IdentityError::ExternalService(format!("{capability}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(IdentityError::ExternalService(format!(
            "{capability} returned {status}"
        )));
    }

    response
        .json()
        .await
        .map_err(|e| IdentityError::ExternalService(format!("{capability} reply: {e}")))
}

/// Customer-creation capability over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCustomersClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCustomersClient {
    /// Create a client against `base_url` (no trailing slash).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[derive(Deserialize)]
struct CustomerReply {
    customer_id: String,
}

impl CustomersClient for HttpCustomersClient {
    async fn create_customer(
        &self,
        idempotency_key: &str,
        external_ref: &str,
        profile: &CustomerProfile,
    ) -> Result<String> {
        let url = format!("{}/v1/customers", self.base_url);
        let body = json!({
            "external_ref": external_ref,
            "full_name": profile.full_name,
            "birth_date": profile.birth_date,
            "tin": profile.tin,
            "email": profile.email,
            "phone": profile.phone,
        });
        let reply: CustomerReply =
            post_json(&self.client, &url, idempotency_key, &body, "customers").await?;
        Ok(reply.customer_id)
    }
}

/// Account-creation capability over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAccountsClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAccountsClient {
    /// Create a client against `base_url` (no trailing slash).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[derive(Deserialize)]
struct AccountReply {
    account_id: String,
}

impl AccountsClient for HttpAccountsClient {
    async fn create_account(
        &self,
        idempotency_key: &str,
        external_ref: &str,
        customer_id: &str,
        product_type: &str,
        currency: &Currency,
    ) -> Result<String> {
        let url = format!("{}/v1/accounts", self.base_url);
        let body = json!({
            "external_ref": external_ref,
            "customer_id": customer_id,
            "product_type": product_type,
            "currency": currency.as_str(),
        });
        let reply: AccountReply =
            post_json(&self.client, &url, idempotency_key, &body, "accounts").await?;
        Ok(reply.account_id)
    }
}

/// Ledger-credit capability over HTTP.
#[derive(Debug, Clone)]
pub struct HttpLedgerClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpLedgerClient {
    /// Create a client against `base_url` (no trailing slash).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[derive(Deserialize)]
struct JournalReply {
    journal_id: String,
}

impl LedgerClient for HttpLedgerClient {
    async fn credit_account(
        &self,
        idempotency_key: &str,
        account_id: &str,
        currency: &Currency,
        amount: Decimal,
        initiated_by: &str,
        external_ref: &str,
        reason: &str,
        customer_id: &str,
    ) -> Result<String> {
        let url = format!("{}/v1/ledger/credits", self.base_url);
        let body = json!({
            "account_id": account_id,
            "currency": currency.as_str(),
            "amount": amount.to_string(),
            "initiated_by": initiated_by,
            "external_ref": external_ref,
            "reason": reason,
            "customer_id": customer_id,
        });
        let reply: JournalReply =
            post_json(&self.client, &url, idempotency_key, &body, "ledger").await?;
        Ok(reply.journal_id)
    }
}
