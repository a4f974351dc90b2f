//! Account service: creation, balances, holds, transfer validation.

use crate::error::{AccountsError, Result};
use crate::providers::{
    AccountStore, BalanceStore, CreateAccount, CreatedAccount, CustomerStore, LimitsStore,
};
use crate::state::{Account, AccountId, AccountStatus, Balance, AccountLimits, CustomerId};
use banca_core::{Clock, Currency, SystemClock};
use rust_decimal::Decimal;
use tracing::info;

/// An account together with its balance row.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountView {
    /// The account.
    pub account: Account,
    /// Its balances (zero-valued when the row is missing).
    pub balances: Balance,
}

/// Input to [`AccountService::validate_transfer`].
#[derive(Debug, Clone)]
pub struct ValidateTransferCommand {
    /// Source account.
    pub source_account_id: AccountId,
    /// Destination account. Equal to the source for pure credits.
    pub destination_account_id: AccountId,
    /// Transfer currency.
    pub currency: Currency,
    /// Transfer amount.
    pub amount: Decimal,
}

/// Outcome of a transfer validation: a verdict, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferCheck {
    /// Whether the transfer may proceed.
    pub ok: bool,
    /// Why not, when `ok` is false.
    pub reason: Option<String>,
}

impl TransferCheck {
    fn pass() -> Self {
        Self {
            ok: true,
            reason: None,
        }
    }

    fn fail(reason: &str) -> Self {
        Self {
            ok: false,
            reason: Some(reason.to_string()),
        }
    }
}

/// Account lifecycle and balance operations.
///
/// Hold reservation and release delegate to the balance store's atomic
/// conditional updates; this service adds the account-level checks
/// (existence, status, currency, positive amount) but never wraps the
/// balance mutation in a lock of its own.
#[derive(Debug, Clone)]
pub struct AccountService<A, C, B, L, K = SystemClock> {
    accounts: A,
    customers: C,
    balances: B,
    limits: L,
    clock: K,
}

impl<A, C, B, L> AccountService<A, C, B, L> {
    /// Create the service on the system clock.
    pub const fn new(accounts: A, customers: C, balances: B, limits: L) -> Self {
        Self {
            accounts,
            customers,
            balances,
            limits,
            clock: SystemClock,
        }
    }
}

impl<A, C, B, L, K> AccountService<A, C, B, L, K>
where
    A: AccountStore,
    C: CustomerStore,
    B: BalanceStore,
    L: LimitsStore,
    K: Clock,
{
    /// Create the service on a caller-supplied clock.
    pub const fn with_clock(accounts: A, customers: C, balances: B, limits: L, clock: K) -> Self {
        Self {
            accounts,
            customers,
            balances,
            limits,
            clock,
        }
    }

    /// Create an account for an existing customer, with a zero-valued
    /// balance row and zero (unlimited) daily limits.
    ///
    /// This call carries no idempotency key of its own; only the
    /// opening saga's bonus key is deduplicated. Two racing direct
    /// calls can create two accounts for the same
    /// customer/product/currency.
    ///
    /// # Errors
    ///
    /// Returns
    /// [`CustomerNotFound`](AccountsError::CustomerNotFound) for an
    /// unknown customer, or a storage error.
    pub async fn create(
        &self,
        customer_id: CustomerId,
        product_type: &str,
        currency: &Currency,
    ) -> Result<CreatedAccount> {
        if !self.customers.exists(customer_id).await? {
            return Err(AccountsError::CustomerNotFound);
        }

        let now = self.clock.now();
        let id = AccountId::new();
        let account = Account {
            id,
            customer_id,
            product_type: product_type.to_string(),
            currency: currency.clone(),
            status: AccountStatus::Active,
            account_number: Account::derive_number(id),
            opened_at: now,
            updated_at: now,
        };

        self.accounts.insert(&account).await?;
        self.balances.init_zero(id).await?;
        self.limits
            .patch(id, Some(Decimal::ZERO), Some(Decimal::ZERO))
            .await?;

        info!(account_id = %id, customer_id = %customer_id, product_type, "account created");

        Ok(CreatedAccount {
            account_id: id,
            account_number: account.account_number,
        })
    }

    /// Read the balances of an account.
    ///
    /// # Errors
    ///
    /// Returns [`BalanceNotFound`](AccountsError::BalanceNotFound) when
    /// the account has no balance row.
    pub async fn get_balances(&self, account_id: AccountId) -> Result<Balance> {
        self.balances
            .find(account_id)
            .await?
            .ok_or(AccountsError::BalanceNotFound(account_id))
    }

    /// All accounts of a customer with their balances.
    ///
    /// # Errors
    ///
    /// Returns error on storage failure.
    pub async fn list_by_customer(&self, customer_id: CustomerId) -> Result<Vec<AccountView>> {
        let accounts = self.accounts.find_by_customer(customer_id).await?;
        let mut views = Vec::with_capacity(accounts.len());
        for account in accounts {
            let balances = self
                .balances
                .find(account.id)
                .await?
                .unwrap_or_else(|| Balance::zero(account.id));
            views.push(AccountView { account, balances });
        }
        Ok(views)
    }

    /// Reserve a hold against the available balance. Returns the new
    /// hold total.
    ///
    /// # Errors
    ///
    /// - [`InvalidAmount`](AccountsError::InvalidAmount) unless
    ///   `amount > 0`
    /// - [`AccountNotFound`](AccountsError::AccountNotFound) /
    ///   [`AccountNotActive`](AccountsError::AccountNotActive) /
    ///   [`CurrencyMismatch`](AccountsError::CurrencyMismatch) from the
    ///   account checks
    /// - [`InsufficientFunds`](AccountsError::InsufficientFunds) from
    ///   the atomic conditional update
    pub async fn reserve_hold(
        &self,
        account_id: AccountId,
        currency: &Currency,
        amount: Decimal,
    ) -> Result<Decimal> {
        let account = self.checked_account(account_id, currency).await?;
        if account.status != AccountStatus::Active {
            return Err(AccountsError::AccountNotActive { account_id });
        }
        require_positive(amount)?;
        self.balances.reserve_hold(account_id, amount).await
    }

    /// Release a previously reserved hold. Returns the new hold total.
    ///
    /// # Errors
    ///
    /// - [`InvalidAmount`](AccountsError::InvalidAmount) unless
    ///   `amount > 0`
    /// - [`AccountNotFound`](AccountsError::AccountNotFound) /
    ///   [`CurrencyMismatch`](AccountsError::CurrencyMismatch) from the
    ///   account checks
    /// - [`InvalidHoldState`](AccountsError::InvalidHoldState) when the
    ///   release exceeds the current hold
    pub async fn release_hold(
        &self,
        account_id: AccountId,
        currency: &Currency,
        amount: Decimal,
    ) -> Result<Decimal> {
        self.checked_account(account_id, currency).await?;
        require_positive(amount)?;
        self.balances.release_hold(account_id, amount).await
    }

    /// Update daily limits; only the provided fields are patched.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidAmount`](AccountsError::InvalidAmount) for a
    /// negative limit, or a storage error.
    pub async fn patch_limits(
        &self,
        account_id: AccountId,
        daily_out: Option<Decimal>,
        daily_in: Option<Decimal>,
    ) -> Result<AccountLimits> {
        for limit in [daily_out, daily_in].into_iter().flatten() {
            if limit < Decimal::ZERO {
                return Err(AccountsError::InvalidAmount {
                    reason: "limits must be >= 0".to_string(),
                });
            }
        }
        self.limits.patch(account_id, daily_out, daily_in).await
    }

    /// Pre-flight validation of a transfer: account existence, status,
    /// currency, available funds for debits, and daily limits. Returns
    /// a verdict, so a failing check is not an error.
    ///
    /// # Errors
    ///
    /// Returns error only on storage failure.
    pub async fn validate_transfer(&self, cmd: ValidateTransferCommand) -> Result<TransferCheck> {
        if cmd.amount <= Decimal::ZERO {
            return Ok(TransferCheck::fail("amount must be > 0"));
        }

        let Some(source) = self.accounts.find(cmd.source_account_id).await? else {
            return Ok(TransferCheck::fail("source account not found"));
        };
        let Some(destination) = self.accounts.find(cmd.destination_account_id).await? else {
            return Ok(TransferCheck::fail("destination account not found"));
        };

        if source.status != AccountStatus::Active {
            return Ok(TransferCheck::fail("source not active"));
        }
        if destination.status != AccountStatus::Active {
            return Ok(TransferCheck::fail("destination not active"));
        }
        if source.currency != cmd.currency {
            return Ok(TransferCheck::fail("source currency mismatch"));
        }
        if destination.currency != cmd.currency {
            return Ok(TransferCheck::fail("destination currency mismatch"));
        }

        // Same source and destination means a pure credit: available is
        // not checked, only the destination's daily-in limit.
        if cmd.source_account_id == cmd.destination_account_id {
            if let Some(limits) = self.limits.find(destination.id).await? {
                if limits.daily_in > Decimal::ZERO && cmd.amount > limits.daily_in {
                    return Ok(TransferCheck::fail("dailyIn limit exceeded"));
                }
            }
            return Ok(TransferCheck::pass());
        }

        let balance = self
            .balances
            .find(source.id)
            .await?
            .unwrap_or_else(|| Balance::zero(source.id));
        if balance.available < cmd.amount {
            return Ok(TransferCheck::fail("insufficient available"));
        }

        if let Some(limits) = self.limits.find(source.id).await? {
            if limits.daily_out > Decimal::ZERO && cmd.amount > limits.daily_out {
                return Ok(TransferCheck::fail("dailyOut limit exceeded"));
            }
        }

        Ok(TransferCheck::pass())
    }

    async fn checked_account(
        &self,
        account_id: AccountId,
        currency: &Currency,
    ) -> Result<Account> {
        let account = self
            .accounts
            .find(account_id)
            .await?
            .ok_or(AccountsError::AccountNotFound(account_id))?;
        if &account.currency != currency {
            return Err(AccountsError::CurrencyMismatch { account_id });
        }
        Ok(account)
    }
}

impl<A, C, B, L, K> CreateAccount for AccountService<A, C, B, L, K>
where
    A: AccountStore,
    C: CustomerStore,
    B: BalanceStore,
    L: LimitsStore,
    K: Clock,
{
    async fn create_account(
        &self,
        customer_id: CustomerId,
        product_type: &str,
        currency: &Currency,
    ) -> Result<CreatedAccount> {
        self.create(customer_id, product_type, currency).await
    }
}

fn require_positive(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(AccountsError::InvalidAmount {
            reason: "amount must be > 0".to_string(),
        });
    }
    Ok(())
}
