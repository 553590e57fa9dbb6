//! Amount type
//!
//! Domain primitives for monetary values. Amounts are validated at
//! construction time, so an `Amount` that exists is always positive and a
//! `Balance` that exists is never negative.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

/// Smallest amount accepted for a single transfer (₹1)
pub const MIN_TRANSFER_UNITS: i64 = 1;

/// Largest amount accepted for a single transfer (₹1,00,000)
pub const MAX_TRANSFER_UNITS: i64 = 100_000;

/// Decimal places used when amounts are shown to people
pub const DISPLAY_SCALE: u32 = 2;

/// Amount represents a validated, strictly positive monetary value.
///
/// # Example
/// ```
/// use rust_decimal::Decimal;
/// use arthanidhi_ledger::domain::Amount;
///
/// let amount: Amount = "1500.50".parse().unwrap();
/// assert_eq!(amount.value(), Decimal::new(150050, 2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Amount(Decimal);

/// Errors that can occur when creating an Amount or Balance
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Amount must be positive (got {0})")]
    NotPositive(Decimal),

    #[error("Balance cannot be negative (got {0})")]
    Negative(Decimal),

    #[error("Amount is not a finite number")]
    NotFinite,

    #[error("Amount exceeds the representable range: {0}")]
    TooLarge(String),

    #[error("Invalid amount format: {0}")]
    ParseError(String),
}

impl Amount {
    /// Create a new Amount, rejecting zero and negative values.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value <= Decimal::ZERO {
            return Err(AmountError::NotPositive(value));
        }
        Ok(Self(value))
    }

    /// Create an Amount from whole currency units.
    pub fn from_units(units: i64) -> Result<Self, AmountError> {
        Self::new(Decimal::from(units))
    }

    /// Get the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Whether the amount lies in the inclusive per-transfer window.
    pub fn is_within_transfer_limits(&self) -> bool {
        self.0 >= Decimal::from(MIN_TRANSFER_UNITS) && self.0 <= Decimal::from(MAX_TRANSFER_UNITS)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError::ParseError("empty".to_string()));
        }
        // Digit separators are a typo in form input, not a grouping
        if trimmed.contains('_') {
            return Err(AmountError::ParseError(trimmed.to_string()));
        }

        match Decimal::from_str(trimmed) {
            Ok(decimal) => Amount::new(decimal),
            Err(e) => match trimmed.parse::<f64>() {
                Ok(value) if value.is_finite() && value > 0.0 => {
                    Err(AmountError::TooLarge(trimmed.to_string()))
                }
                Ok(value) if !value.is_finite() => Err(AmountError::NotFinite),
                _ => Err(AmountError::ParseError(format!("{} ({})", trimmed, e))),
            },
        }
    }
}

impl TryFrom<String> for Amount {
    type Error = AmountError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Amount::from_str(&value)
    }
}

impl From<NonZeroU32> for Amount {
    fn from(units: NonZeroU32) -> Self {
        Self(Decimal::from(units.get()))
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> Self {
        amount.0.to_string()
    }
}

/// Balance represents an account balance (zero or positive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance(Decimal);

impl Balance {
    /// Create a new balance, rejecting negative values
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value < Decimal::ZERO {
            return Err(AmountError::Negative(value));
        }
        Ok(Self(value))
    }

    /// Create a zero balance
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Get the underlying value
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Check if balance covers a withdrawal of `amount`
    pub fn is_sufficient_for(&self, amount: &Amount) -> bool {
        self.0 >= amount.value()
    }

    /// Balance after applying a signed delta, or `None` when the result
    /// would be negative or overflow.
    pub fn checked_apply(&self, delta: Decimal) -> Option<Balance> {
        self.0
            .checked_add(delta)
            .and_then(|value| Balance::new(value).ok())
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Default for Balance {
    fn default() -> Self {
        Self::zero()
    }
}

/// Format a value in Indian digit grouping with the rupee sign,
/// e.g. `₹1,00,000.00`.
pub fn format_inr(value: Decimal) -> String {
    let rounded = value.round_dp(DISPLAY_SCALE);
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    let text = format!("{:.2}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    format!("{}₹{}.{}", sign, group_indian(whole), fraction)
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut end = head.len();
    while end > 2 {
        groups.push(&head[end - 2..end]);
        end -= 2;
    }
    groups.push(&head[..end]);
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}
