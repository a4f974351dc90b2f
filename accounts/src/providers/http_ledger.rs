//! HTTP implementation of the ledger-credit capability.

use crate::error::{AccountsError, Result};
use crate::providers::{CreditRequest, LedgerClient};
use crate::state::JournalId;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Serialize)]
struct CreditBody<'a> {
    account_id: &'a str,
    currency: &'a str,
    amount: String,
    initiated_by: &'a str,
    external_ref: &'a str,
    reason: &'a str,
    customer_id: &'a str,
}

#[derive(Deserialize)]
struct CreditReply {
    journal_id: String,
}

/// Ledger-credit capability over HTTP.
///
/// The idempotency key travels as the `idempotency-key` header; the
/// ledger deduplicates postings on it.
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

impl LedgerClient for HttpLedgerClient {
    async fn credit_account(&self, request: CreditRequest) -> Result<JournalId> {
        let url = format!("{}/v1/ledger/credits", self.base_url);
        let account_id = request.account_id.to_string();
        let customer_id = request.customer_id.to_string();
        let body = CreditBody {
            account_id: &account_id,
            currency: request.currency.as_str(),
            amount: request.amount.to_string(),
            initiated_by: &request.initiated_by,
            external_ref: &request.external_ref,
            reason: &request.reason,
            customer_id: &customer_id,
        };

        debug!(
            account_id = %request.account_id,
            idempotency_key = %request.idempotency_key,
            "requesting ledger credit"
        );

        let response = self
            .client
            .post(&url)
            .header("idempotency-key", &request.idempotency_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AccountsError::ExternalService(format!("ledger: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AccountsError::ExternalService(format!(
                "ledger credit returned {status}"
            )));
        }

        let reply: CreditReply = response
            .json()
            .await
            .map_err(|e| AccountsError::ExternalService(format!("ledger reply: {e}")))?;

        Ok(JournalId(reply.journal_id))
    }
}
