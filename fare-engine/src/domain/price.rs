//! Non-negative fare amount.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid price.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid price {input:?}: {reason}")]
pub struct InvalidPrice {
    input: String,
    reason: &'static str,
}

/// A non-negative decimal amount, in the units of its fare's currency.
///
/// Backed by [`Decimal`] so that sums of fares never pick up binary
/// floating point error: `0.10 + 0.20` is exactly `0.30`.
///
/// # Examples
///
/// ```
/// use fare_engine::domain::Price;
///
/// let a = Price::parse("2.00").unwrap();
/// let b = Price::parse("1.50").unwrap();
/// assert_eq!(a.checked_add(b).unwrap(), Price::parse("3.5").unwrap());
///
/// // Negative amounts are rejected
/// assert!(Price::parse("-1").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Price(Decimal);

impl Price {
    /// The zero amount.
    pub const ZERO: Price = Price(Decimal::ZERO);

    /// Wrap a decimal amount, rejecting negative values.
    pub fn new(amount: Decimal) -> Result<Self, InvalidPrice> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(InvalidPrice {
                input: amount.to_string(),
                reason: "must not be negative",
            });
        }
        Ok(Price(amount.normalize()))
    }

    /// Parse a price from its decimal text form (GTFS `price`).
    pub fn parse(s: &str) -> Result<Self, InvalidPrice> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(InvalidPrice {
                input: s.to_string(),
                reason: "cannot be empty",
            });
        }
        let amount = Decimal::from_str(trimmed).map_err(|_| InvalidPrice {
            input: s.to_string(),
            reason: "not a decimal number",
        })?;
        Price::new(amount).map_err(|e| InvalidPrice {
            input: s.to_string(),
            reason: e.reason,
        })
    }

    /// Returns the underlying decimal amount.
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Add two prices, returning `None` on overflow.
    pub fn checked_add(self, other: Price) -> Option<Price> {
        self.0.checked_add(other.0).map(Price)
    }
}

impl TryFrom<String> for Price {
    type Error = InvalidPrice;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Price::parse(&s)
    }
}

impl From<Price> for String {
    fn from(price: Price) -> String {
        price.to_string()
    }
}

impl fmt::Debug for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Price({})", self)
    }
}

impl fmt::Display for Price {
    /// Renders with at least two fractional digits (`2` as `2.00`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut amount = self.0;
        if amount.scale() < 2 {
            amount.rescale(2);
        }
        write!(f, "{}", amount)
    }
}
