//! Non-negative monetary amounts using decimal arithmetic.
//!
//! The storefront is single-currency and the shipping policy thresholds are
//! currency-agnostic, so [`Money`] carries no currency code. All arithmetic is
//! exact decimal arithmetic; binary floating point never touches a price.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Errors produced when constructing a [`Money`] value.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// Prices and totals can never be negative.
    #[error("amount cannot be negative: {0}")]
    Negative(Decimal),
    /// Amounts above [`Money::MAX_AMOUNT`] are refused.
    #[error("amount is too large: {0}")]
    TooLarge(Decimal),
    /// The input could not be parsed as a decimal number.
    #[error("invalid amount: {0}")]
    Invalid(String),
}

/// A non-negative amount of money.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest amount accepted from input, in whole currency units.
    pub const MAX_AMOUNT: u64 = 1_000_000_000_000;

    /// Create an amount from a decimal.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Negative`] if `amount` is below zero, or
    /// [`MoneyError::TooLarge`] if it exceeds [`Self::MAX_AMOUNT`].
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative(amount));
        }
        if amount > Decimal::from(Self::MAX_AMOUNT) {
            return Err(MoneyError::TooLarge(amount));
        }
        Ok(Self(amount))
    }

    /// Create an amount from a whole number of currency units.
    #[must_use]
    pub fn from_units(units: u32) -> Self {
        Self(Decimal::from(units))
    }

    /// Create an amount from minor units (e.g. paise or cents).
    ///
    /// `Money::from_minor(14999)` is `149.99`.
    #[must_use]
    pub fn from_minor(minor: u64) -> Self {
        Self(Decimal::from(minor) / Decimal::ONE_HUNDRED)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether this amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl std::str::FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = s
            .trim()
            .parse::<Decimal>()
            .map_err(|_| MoneyError::Invalid(s.to_string()))?;
        Self::new(amount)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

// Saturating arithmetic, so totals never panic.
impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self::Output {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Self> for Money {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
