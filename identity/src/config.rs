//! Activation configuration.

use banca_core::Currency;
use rust_decimal::Decimal;

/// Policy for the activation saga's account and bonus sub-steps.
#[derive(Debug, Clone)]
pub struct ActivationConfig {
    /// Product type of the primary account.
    pub product_type: String,
    /// Currency of the primary account and bonus.
    pub currency: Currency,
    /// Opening-bonus amount.
    pub bonus_amount: Decimal,
    /// Reason recorded on the bonus posting.
    pub bonus_reason: String,
    /// External reference recorded on the bonus posting.
    pub bonus_external_ref: String,
    /// Actor recorded on the bonus posting.
    pub initiated_by: String,
}

impl ActivationConfig {
    /// Set the primary-account product type.
    #[must_use]
    pub fn with_product_type(mut self, product_type: impl Into<String>) -> Self {
        self.product_type = product_type.into();
        self
    }

    /// Set the bonus amount.
    #[must_use]
    pub fn with_bonus_amount(mut self, amount: Decimal) -> Self {
        self.bonus_amount = amount;
        self
    }
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            product_type: "checking".to_string(),
            currency: Currency::usd(),
            bonus_amount: Decimal::new(50_00, 2),
            bonus_reason: "registration_bonus".to_string(),
            bonus_external_ref: "bonus:registration".to_string(),
            initiated_by: "system".to_string(),
        }
    }
}
