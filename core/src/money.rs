//! Currency codes.
//!
//! Amounts themselves are `rust_decimal::Decimal` everywhere: exact
//! decimal arithmetic, no floats near money. The only shared money type
//! is the ISO-4217 currency code that travels with every amount across
//! the ledger boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error parsing a currency code.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid currency code: {0:?}")]
pub struct InvalidCurrency(pub String);

/// ISO-4217 currency code (three uppercase ASCII letters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    /// Parse and normalize a currency code.
    ///
    /// Accepts lowercase input (`"usd"` → `USD`).
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCurrency`] unless the input is exactly three
    /// ASCII letters.
    pub fn parse(code: &str) -> Result<Self, InvalidCurrency> {
        let code = code.trim();
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(code.to_ascii_uppercase()))
        } else {
            Err(InvalidCurrency(code.to_string()))
        }
    }

    /// The US dollar code.
    #[must_use]
    pub fn usd() -> Self {
        Self("USD".to_string())
    }

    /// The normalized code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Currency {
    type Err = InvalidCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalizes() {
        assert_eq!(Currency::parse("usd").unwrap().as_str(), "USD");
        assert_eq!(Currency::parse(" EUR ").unwrap().as_str(), "EUR");
    }

    #[test]
    fn rejects_junk() {
        for bad in ["", "US", "USDX", "U$D", "123"] {
            assert!(Currency::parse(bad).is_err(), "{bad:?} should not parse");
        }
    }
}
