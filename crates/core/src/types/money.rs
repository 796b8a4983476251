//! Monetary amounts using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// ISO 4217 currency codes accepted by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    /// Argentine peso - the store's default currency.
    #[default]
    ARS,
    USD,
    EUR,
}

/// Error parsing a [`CurrencyCode`] from a string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown currency code: {0}")]
pub struct CurrencyCodeError(pub String);

impl CurrencyCode {
    /// Returns the ISO 4217 code as a string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ARS => "ARS",
            Self::USD => "USD",
            Self::EUR => "EUR",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = CurrencyCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ARS" => Ok(Self::ARS),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            other => Err(CurrencyCodeError(other.to_owned())),
        }
    }
}

/// A monetary amount with its currency.
///
/// Amounts are kept in the currency's standard unit (pesos, not centavos)
/// using decimal arithmetic so that totals are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Decimal amount, serialized as a string to preserve precision.
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Money {
    /// Create a new amount.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency_code,
        }
    }

    /// Multiply this amount by an integer quantity.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self {
            amount: self.amount * Decimal::from(quantity),
            currency_code: self.currency_code,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency_code)
    }
}
