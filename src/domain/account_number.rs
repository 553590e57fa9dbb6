//! Account numbers
//!
//! External-facing account identifiers of the form `^[A-Z]{2}\d{10,12}$`,
//! e.g. `AN1234567890`.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prefix used for accounts opened by this bank
pub const BANK_PREFIX: &str = "AN";

const MIN_DIGITS: usize = 10;
const MAX_DIGITS: usize = 12;

/// A well-formed account number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountNumber(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid account number format: {0:?} (expected two capital letters followed by 10-12 digits)")]
pub struct AccountNumberError(pub String);

impl AccountNumber {
    /// Parse an account number exactly as given (no trimming).
    pub fn parse(raw: &str) -> Result<Self, AccountNumberError> {
        if Self::is_well_formed(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(AccountNumberError(raw.to_string()))
        }
    }

    /// Check `raw` against `^[A-Z]{2}\d{10,12}$`.
    pub fn is_well_formed(raw: &str) -> bool {
        let bytes = raw.as_bytes();
        let digits = bytes.len().saturating_sub(2);

        bytes.len() >= 2
            && (MIN_DIGITS..=MAX_DIGITS).contains(&digits)
            && bytes[..2].iter().all(u8::is_ascii_uppercase)
            && bytes[2..].iter().all(u8::is_ascii_digit)
    }

    /// Generate a random account number with the bank prefix and twelve digits.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let digits: u64 = rng.gen_range(0..1_000_000_000_000);
        Self(format!("{}{:012}", BANK_PREFIX, digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccountNumber {
    type Err = AccountNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AccountNumber {
    type Error = AccountNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AccountNumber> for String {
    fn from(number: AccountNumber) -> Self {
        number.0
    }
}

impl PartialEq<str> for AccountNumber {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}
