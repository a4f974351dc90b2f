//! Account opening with a one-time opening bonus.

use crate::config::{OPENING_BONUS_KEY_SUFFIX, OpeningBonusConfig};
use crate::error::Result;
use crate::providers::{
    AccountStore, BalanceStore, BonusGrantStore, CreateAccount, CreditRequest, LedgerClient,
};
use crate::state::{CustomerId, JournalId, OpeningBonusGrant};
use banca_core::{Claim, Currency};
use rust_decimal::Decimal;
use tracing::{debug, info};

/// Input to [`AccountOpeningService::open`].
#[derive(Debug, Clone)]
pub struct OpenAccountCommand {
    /// Customer opening the account.
    pub customer_id: CustomerId,
    /// Product type, e.g. `"checking"`.
    pub product_type: String,
    /// Account currency.
    pub currency: Currency,
    /// Caller-supplied idempotency key. When absent, a deterministic
    /// key is derived from customer/product/currency.
    pub idempotency_key: Option<String>,
    /// Actor recorded on the bonus posting; defaults to `system`.
    pub initiated_by: Option<String>,
}

/// Terminal result of an opening. Identical across retries of the same
/// idempotency key.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OpenAccountResult {
    /// The opened account.
    pub account_id: crate::state::AccountId,
    /// Its 12-digit display number.
    pub account_number: String,
    /// Journal id of the bonus posting.
    pub journal_id: JournalId,
    /// Always `"opened"` on success.
    pub status: String,
}

/// Drives account creation plus the one-time opening bonus.
///
/// Exactly-once effect from at-least-once invocation, without a
/// distributed transaction: the ledger deduplicates the posting on the
/// bonus key, and the grant store's uniqueness-constrained insert
/// elects the single caller that applies the local balance credit.
/// There is no compensating rollback; a failed call is retried from
/// the top and resumes safely.
#[derive(Debug, Clone)]
pub struct AccountOpeningService<C, L, B, G, A> {
    create_account: C,
    ledger: L,
    balances: B,
    grants: G,
    accounts: A,
    config: OpeningBonusConfig,
}

impl<C, L, B, G, A> AccountOpeningService<C, L, B, G, A>
where
    C: CreateAccount,
    L: LedgerClient,
    B: BalanceStore,
    G: BonusGrantStore,
    A: AccountStore,
{
    /// Create the saga with the given bonus policy.
    pub const fn new(
        create_account: C,
        ledger: L,
        balances: B,
        grants: G,
        accounts: A,
        config: OpeningBonusConfig,
    ) -> Self {
        Self {
            create_account,
            ledger,
            balances,
            grants,
            accounts,
            config,
        }
    }

    /// Open an account and grant the opening bonus exactly once.
    ///
    /// Retries with the same idempotency key return the recorded
    /// `(account_id, account_number, journal_id, "opened")` without
    /// re-running any step.
    ///
    /// # Errors
    ///
    /// A failure while creating the account or requesting the ledger
    /// credit aborts with no local state written, so the whole call is
    /// safe to retry from the start.
    pub async fn open(&self, cmd: OpenAccountCommand) -> Result<OpenAccountResult> {
        let initiated_by = cmd
            .initiated_by
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "system".to_string());
        let bonus_key = format!(
            "{}{OPENING_BONUS_KEY_SUFFIX}",
            normalize_key(
                cmd.idempotency_key.as_deref(),
                cmd.customer_id,
                &cmd.product_type,
                &cmd.currency,
            )
        );

        // A grant on file means the whole opening already happened.
        if let Some(grant) = self.grants.find_by_key(&bonus_key).await? {
            debug!(bonus_key = %bonus_key, "opening already granted; returning recorded result");
            return self.result_from_grant(&grant).await;
        }

        let created = self
            .create_account
            .create_account(cmd.customer_id, &cmd.product_type, &cmd.currency)
            .await?;

        // The ledger dedupes on the bonus key, so re-entering this step
        // cannot double-post.
        let journal_id = self
            .ledger
            .credit_account(CreditRequest {
                idempotency_key: bonus_key.clone(),
                account_id: created.account_id,
                currency: self.config.currency.clone(),
                amount: self.config.amount,
                initiated_by,
                external_ref: self.config.external_ref.clone(),
                reason: self.config.reason.clone(),
                customer_id: cmd.customer_id,
            })
            .await?;

        let grant = OpeningBonusGrant {
            idempotency_key: bonus_key.clone(),
            account_id: created.account_id,
            journal_id: journal_id.clone(),
            amount: self.config.amount,
            currency: self.config.currency.clone(),
        };

        match self.grants.try_insert(grant).await? {
            Claim::First => {
                // Only the insert winner applies the local credit.
                self.balances
                    .apply_deltas(
                        created.account_id,
                        self.config.amount,
                        self.config.amount,
                        Decimal::ZERO,
                    )
                    .await?;

                info!(
                    account_id = %created.account_id,
                    journal_id = %journal_id,
                    bonus_key = %bonus_key,
                    "account opened with bonus"
                );

                Ok(OpenAccountResult {
                    account_id: created.account_id,
                    account_number: created.account_number,
                    journal_id,
                    status: "opened".to_string(),
                })
            }
            Claim::Existing(winner) => {
                // A concurrent duplicate won the grant; its credit is
                // the one that counts.
                debug!(bonus_key = %bonus_key, "lost grant race; returning winner's result");
                self.result_from_grant(&winner).await
            }
        }
    }

    async fn result_from_grant(&self, grant: &OpeningBonusGrant) -> Result<OpenAccountResult> {
        let account_number = self
            .accounts
            .find(grant.account_id)
            .await?
            .map(|a| a.account_number)
            .unwrap_or_default();
        Ok(OpenAccountResult {
            account_id: grant.account_id,
            account_number,
            journal_id: grant.journal_id.clone(),
            status: "opened".to_string(),
        })
    }
}

/// Normalize the caller's key; a blank key falls back to a key derived
/// from the request's identity.
fn normalize_key(
    key: Option<&str>,
    customer_id: CustomerId,
    product_type: &str,
    currency: &Currency,
) -> String {
    match key.map(str::trim).filter(|k| !k.is_empty()) {
        Some(key) => key.to_string(),
        None => format!("open:{customer_id}:{product_type}:{currency}"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn blank_keys_fall_back_to_request_identity() {
        let customer_id = CustomerId::new();
        let currency = Currency::usd();

        let derived = normalize_key(None, customer_id, "checking", &currency);
        assert_eq!(derived, format!("open:{customer_id}:checking:USD"));
        assert_eq!(
            normalize_key(Some("  "), customer_id, "checking", &currency),
            derived
        );
        assert_eq!(
            normalize_key(Some(" abc123 "), customer_id, "checking", &currency),
            "abc123"
        );
    }
}
