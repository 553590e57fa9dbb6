//! Beneficiary Validator
//!
//! Advisory lookup of a destination account number. There is no bank
//! directory behind it: a few numbers are always known, any other
//! well-formed number is accepted at random. The transfer engine never
//! consults this result.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::domain::AccountNumber;

/// Numbers that always resolve
pub const KNOWN_BENEFICIARIES: [&str; 4] = [
    "AN1234567890",
    "AN9876543210",
    "AN5555666677",
    "AN1111222233",
];

/// Share of unknown well-formed numbers that resolve
pub const DEFAULT_ACCEPTANCE_RATE: f64 = 0.7;

const RESOLVED_NAME: &str = "John Doe";

/// Outcome of an advisory beneficiary lookup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeneficiaryCheck {
    pub valid: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_name: Option<String>,
}

impl BeneficiaryCheck {
    fn resolved() -> Self {
        Self {
            valid: true,
            message: "Valid account number".to_string(),
            beneficiary_name: Some(RESOLVED_NAME.to_string()),
        }
    }

    fn rejected(message: &str) -> Self {
        Self {
            valid: false,
            message: message.to_string(),
            beneficiary_name: None,
        }
    }
}

pub struct BeneficiaryValidator {
    acceptance_rate: f64,
    rng: Mutex<StdRng>,
}

impl BeneficiaryValidator {
    pub fn new() -> Self {
        Self::with_acceptance_rate(DEFAULT_ACCEPTANCE_RATE)
    }

    /// Validator accepting unknown numbers with probability `rate`
    /// (clamped to `0.0..=1.0`)
    pub fn with_acceptance_rate(rate: f64) -> Self {
        let acceptance_rate = if rate.is_nan() { 0.0 } else { rate.clamp(0.0, 1.0) };
        Self {
            acceptance_rate,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn validate(&self, account_number: &str) -> BeneficiaryCheck {
        let account_number = account_number.trim();

        if !AccountNumber::is_well_formed(account_number) {
            return BeneficiaryCheck::rejected("Invalid account number format");
        }

        let known = KNOWN_BENEFICIARIES.contains(&account_number);
        if known || self.rng.lock().gen_bool(self.acceptance_rate) {
            BeneficiaryCheck::resolved()
        } else {
            tracing::debug!(account_number, "Beneficiary lookup missed");
            BeneficiaryCheck::rejected("Account number not found")
        }
    }
}

impl Default for BeneficiaryValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_format_is_invalid() {
        let validator = BeneficiaryValidator::with_acceptance_rate(1.0);

        let check = validator.validate("12345");

        assert!(!check.valid);
        assert_eq!(check.message, "Invalid account number format");
        assert!(check.beneficiary_name.is_none());
    }

    #[test]
    fn test_known_numbers_always_resolve() {
        let validator = BeneficiaryValidator::with_acceptance_rate(0.0);

        for number in KNOWN_BENEFICIARIES {
            let check = validator.validate(number);
            assert!(check.valid);
            assert_eq!(check.beneficiary_name.as_deref(), Some("John Doe"));
        }
    }

    #[test]
    fn test_unknown_number_follows_rate() {
        assert!(!BeneficiaryValidator::with_acceptance_rate(0.0).validate("AN4444444444").valid);
        assert!(BeneficiaryValidator::with_acceptance_rate(1.0).validate("AN4444444444").valid);
        assert!(BeneficiaryValidator::with_acceptance_rate(7.5).validate("AN4444444444").valid);
    }
}
