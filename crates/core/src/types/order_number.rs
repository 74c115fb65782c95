//! Order number type.

use core::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`OrderNumber`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum OrderNumberError {
    /// The input string is empty.
    #[error("order number cannot be empty")]
    Empty,
    /// The input does not start with the `ORD-` prefix.
    #[error("order number must start with '{prefix}'", prefix = OrderNumber::PREFIX)]
    MissingPrefix,
    /// The suffix is not exactly the expected length.
    #[error("order number suffix must be exactly {len} characters", len = OrderNumber::SUFFIX_LENGTH)]
    BadSuffixLength,
    /// The suffix contains a character outside `A-Z0-9`.
    #[error("order number suffix must contain only uppercase letters and digits")]
    InvalidSuffixChar,
}

/// A customer-facing order number.
///
/// Order numbers have the shape `ORD-` followed by nine uppercase
/// alphanumeric characters, e.g. `ORD-K3F9QZ27M`. They are generated
/// randomly at checkout; collisions are not checked, since only the most
/// recent order is ever retained.
///
/// ## Examples
///
/// ```
/// use clementine_core::OrderNumber;
///
/// assert!(OrderNumber::parse("ORD-ABC123XYZ").is_ok());
///
/// assert!(OrderNumber::parse("").is_err());            // empty
/// assert!(OrderNumber::parse("ABC123XYZ").is_err());   // missing prefix
/// assert!(OrderNumber::parse("ORD-abc123xyz").is_err()); // lowercase suffix
/// assert!(OrderNumber::parse("ORD-SHORT").is_err());   // wrong length
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct OrderNumber(String);

/// Alphabet the random suffix is drawn from.
const SUFFIX_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

impl OrderNumber {
    /// Prefix shared by every order number.
    pub const PREFIX: &'static str = "ORD-";

    /// Length of the random suffix.
    pub const SUFFIX_LENGTH: usize = 9;

    /// Parse an `OrderNumber` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Is empty
    /// - Does not start with `ORD-`
    /// - Has a suffix that is not exactly nine uppercase alphanumerics
    pub fn parse(s: &str) -> Result<Self, OrderNumberError> {
        if s.is_empty() {
            return Err(OrderNumberError::Empty);
        }

        let suffix = s
            .strip_prefix(Self::PREFIX)
            .ok_or(OrderNumberError::MissingPrefix)?;

        if suffix.len() != Self::SUFFIX_LENGTH {
            return Err(OrderNumberError::BadSuffixLength);
        }

        if !suffix
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        {
            return Err(OrderNumberError::InvalidSuffixChar);
        }

        Ok(Self(s.to_owned()))
    }

    /// Generate a fresh random order number.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let suffix: String = (0..Self::SUFFIX_LENGTH)
            .map(|_| {
                let idx = rng.random_range(0..SUFFIX_ALPHABET.len());
                char::from(SUFFIX_ALPHABET[idx])
            })
            .collect();

        Self(format!("{}{suffix}", Self::PREFIX))
    }

    /// Returns the order number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `OrderNumber` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OrderNumber {
    type Err = OrderNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for OrderNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
