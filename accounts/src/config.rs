//! Account service configuration.
//!
//! Configuration values are provided by the application, not read from
//! the environment here.

use banca_core::Currency;
use rust_decimal::Decimal;
use std::time::Duration;

/// Suffix appended to the caller's idempotency key to derive the bonus
/// grant key.
pub const OPENING_BONUS_KEY_SUFFIX: &str = ":opening_bonus";

/// Opening-bonus policy for the account-opening saga.
#[derive(Debug, Clone)]
pub struct OpeningBonusConfig {
    /// Bonus amount credited once per opening.
    pub amount: Decimal,
    /// Bonus currency.
    pub currency: Currency,
    /// Reason recorded on the ledger posting.
    pub reason: String,
    /// External reference recorded on the ledger posting.
    pub external_ref: String,
}

impl OpeningBonusConfig {
    /// Set the bonus amount.
    #[must_use]
    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = amount;
        self
    }

    /// Set the bonus currency.
    #[must_use]
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }
}

impl Default for OpeningBonusConfig {
    fn default() -> Self {
        Self {
            amount: Decimal::new(50_00, 2),
            currency: Currency::usd(),
            reason: "registration_bonus".to_string(),
            external_ref: "bonus:registration".to_string(),
        }
    }
}

/// Poll-loop settings for the ledger-posted consumer.
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Delay between empty polls.
    pub poll_interval: Duration,
    /// Maximum messages fetched per poll.
    pub batch_size: usize,
    /// Event type recorded on inbox rows.
    pub event_type: String,
}

impl ConsumerConfig {
    /// Set the poll interval.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the per-poll batch size.
    #[must_use]
    pub const fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            batch_size: 10,
            event_type: "ledger.journal.posted".to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_bonus_is_fifty() {
        let config = OpeningBonusConfig::default();
        assert_eq!(config.amount.to_string(), "50.00");
        assert_eq!(config.currency.as_str(), "USD");
    }
}
