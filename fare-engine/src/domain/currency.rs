//! Currency codes.

use std::fmt::{self, Write as _};

use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid currency code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid currency code {input:?}: {reason}")]
pub struct InvalidCurrency {
    input: String,
    reason: &'static str,
}

/// An ISO 4217 alphabetic currency code, as in GTFS `currency_type`.
///
/// Holds three uppercase ASCII letters. Codes are compared byte-wise and
/// are not checked against the ISO registry, so `XYZ` is accepted.
///
/// # Examples
///
/// ```
/// use fare_engine::domain::CurrencyCode;
///
/// const CAD: Option<CurrencyCode> = CurrencyCode::from_bytes(*b"CAD");
/// assert_eq!(CAD.unwrap().to_string(), "CAD");
///
/// assert!(CurrencyCode::parse("usd").is_err());
/// assert!(CurrencyCode::parse("USDT").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode {
    letters: [u8; 3],
}

impl CurrencyCode {
    /// Build a code from three bytes, or `None` unless all are `A`-`Z`.
    pub const fn from_bytes(letters: [u8; 3]) -> Option<Self> {
        let mut i = 0;
        while i < letters.len() {
            if !letters[i].is_ascii_uppercase() {
                return None;
            }
            i += 1;
        }
        Some(Self { letters })
    }

    /// Parse a code such as `"EUR"`. Surrounding whitespace is not trimmed.
    pub fn parse(s: &str) -> Result<Self, InvalidCurrency> {
        let invalid = |reason| InvalidCurrency {
            input: s.to_string(),
            reason,
        };
        let letters: [u8; 3] = s
            .as_bytes()
            .try_into()
            .map_err(|_| invalid("expected 3 letters"))?;
        Self::from_bytes(letters).ok_or_else(|| invalid("expected uppercase A-Z"))
    }

    pub fn letters(&self) -> [u8; 3] {
        self.letters
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = InvalidCurrency;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        CurrencyCode::parse(&s)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> String {
        code.to_string()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.letters
            .iter()
            .try_for_each(|&b| f.write_char(char::from(b)))
    }
}

impl fmt::Debug for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CurrencyCode({self})")
    }
}
