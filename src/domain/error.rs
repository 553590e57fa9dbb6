//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::amount::{format_inr, MAX_TRANSFER_UNITS, MIN_TRANSFER_UNITS};

/// Ledger and transfer errors.
///
/// Every variant except `Internal` is an expected, caller-recoverable
/// rejection. `Internal` signals a defect in the ledger itself.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Account id does not resolve to an account
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// No current actor, or the actor's account does not exist
    #[error("User not authenticated. Please login again.")]
    ActorNotFound,

    /// Signup with an identifier that is already registered
    #[error("An account with this email already exists.")]
    DuplicateAccount { email: String },

    /// Beneficiary is empty or not of the form AN1234567890
    #[error("Invalid account number format. Please use format: AN1234567890")]
    InvalidBeneficiaryFormat { beneficiary: String },

    /// Beneficiary is the sender's own account number
    #[error("Cannot transfer to your own account.")]
    SelfTransferRejected,

    /// Amount is not a finite positive number
    #[error("Please enter a valid amount greater than 0.")]
    InvalidAmount { input: String },

    /// Amount outside the per-transfer window
    #[error("{}", range_message(.amount))]
    AmountOutOfRange { amount: Decimal },

    /// Balance does not cover the debit
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },

    /// Signup profile failed field validation
    #[error("{0}")]
    InvalidProfile(String),

    /// Transfer remarks exceed the allowed length
    #[error("Remarks cannot exceed {max} characters (got {actual}).")]
    RemarksTooLong { max: usize, actual: usize },

    /// Defect inside the ledger (id exhaustion, failed compensation)
    #[error("Internal ledger error: {0}")]
    Internal(String),
}

fn range_message(amount: &Decimal) -> String {
    if *amount < Decimal::from(MIN_TRANSFER_UNITS) {
        format!(
            "Minimum transfer amount is {}.",
            format_inr(Decimal::from(MIN_TRANSFER_UNITS))
        )
    } else {
        format!(
            "Maximum transfer amount is {} per transaction.",
            format_inr(Decimal::from(MAX_TRANSFER_UNITS))
        )
    }
}

/// Machine-readable discriminant of a `DomainError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    AccountNotFound,
    ActorNotFound,
    DuplicateAccount,
    InvalidBeneficiaryFormat,
    SelfTransferRejected,
    InvalidAmount,
    AmountOutOfRange,
    InsufficientFunds,
    InvalidProfile,
    RemarksTooLong,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::AccountNotFound => "account_not_found",
            ErrorKind::ActorNotFound => "actor_not_found",
            ErrorKind::DuplicateAccount => "duplicate_account",
            ErrorKind::InvalidBeneficiaryFormat => "invalid_beneficiary_format",
            ErrorKind::SelfTransferRejected => "self_transfer_rejected",
            ErrorKind::InvalidAmount => "invalid_amount",
            ErrorKind::AmountOutOfRange => "amount_out_of_range",
            ErrorKind::InsufficientFunds => "insufficient_funds",
            ErrorKind::InvalidProfile => "invalid_profile",
            ErrorKind::RemarksTooLong => "remarks_too_long",
            ErrorKind::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DomainError {
    /// Create an insufficient funds error
    pub fn insufficient_funds(required: Decimal, available: Decimal) -> Self {
        Self::InsufficientFunds {
            required,
            available,
        }
    }

    pub fn account_not_found(id: impl ToString) -> Self {
        Self::AccountNotFound(id.to_string())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AccountNotFound(_) => ErrorKind::AccountNotFound,
            Self::ActorNotFound => ErrorKind::ActorNotFound,
            Self::DuplicateAccount { .. } => ErrorKind::DuplicateAccount,
            Self::InvalidBeneficiaryFormat { .. } => ErrorKind::InvalidBeneficiaryFormat,
            Self::SelfTransferRejected => ErrorKind::SelfTransferRejected,
            Self::InvalidAmount { .. } => ErrorKind::InvalidAmount,
            Self::AmountOutOfRange { .. } => ErrorKind::AmountOutOfRange,
            Self::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            Self::InvalidProfile(_) => ErrorKind::InvalidProfile,
            Self::RemarksTooLong { .. } => ErrorKind::RemarksTooLong,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Check if this is a defect rather than a validation outcome
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_insufficient_funds_error() {
        let err = DomainError::insufficient_funds(dec!(1000), dec!(500));

        assert!(!err.is_fatal());
        assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
        assert!(err.to_string().contains("1000"));
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_amount_out_of_range_messages() {
        let low = DomainError::AmountOutOfRange { amount: dec!(0.5) };
        assert_eq!(low.to_string(), "Minimum transfer amount is ₹1.00.");

        let high = DomainError::AmountOutOfRange {
            amount: dec!(100000.01),
        };
        assert_eq!(
            high.to_string(),
            "Maximum transfer amount is ₹1,00,000.00 per transaction."
        );
    }

    #[test]
    fn test_internal_is_fatal() {
        let err = DomainError::internal("sequence exhausted");

        assert!(err.is_fatal());
        assert_eq!(err.kind().as_str(), "internal");
    }

    #[test]
    fn test_error_kind_serialization() {
        let json = serde_json::to_string(&ErrorKind::SelfTransferRejected).unwrap();
        assert_eq!(json, r#""self_transfer_rejected""#);

        let kind: ErrorKind = serde_json::from_str(&json).unwrap();
        assert_eq!(kind, ErrorKind::SelfTransferRejected);
        assert_eq!(kind.to_string(), "self_transfer_rejected");
    }
}
