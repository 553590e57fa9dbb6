//! Command definitions
//!
//! Commands represent intentions to change the ledger state.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{AccountId, AccountNumber, AccountProfile, TransactionId};

// =========================================================================
// SignupCommand
// =========================================================================

/// Command to open a new account
#[derive(Debug, Clone, Deserialize)]
pub struct SignupCommand {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl SignupCommand {
    pub fn new(username: String, email: String, password: String) -> Self {
        Self {
            username,
            email,
            password,
        }
    }
}

impl From<SignupCommand> for AccountProfile {
    fn from(command: SignupCommand) -> Self {
        AccountProfile::new(command.username, command.email, command.password)
    }
}

// =========================================================================
// TransferCommand
// =========================================================================

/// Command to send funds from the actor's account to an external account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferCommand {
    /// Account resolved by the session provider, if any
    pub source_account_id: Option<AccountId>,
    /// Destination account number (trimmed before validation)
    pub beneficiary_account_number: String,
    /// Amount to transfer (as string for precise decimal)
    pub amount: String,
    /// Optional remarks
    pub remarks: Option<String>,
}

impl TransferCommand {
    pub fn new(
        source_account_id: Option<AccountId>,
        beneficiary_account_number: String,
        amount: String,
    ) -> Self {
        Self {
            source_account_id,
            beneficiary_account_number,
            amount,
            remarks: None,
        }
    }

    pub fn with_remarks(mut self, remarks: String) -> Self {
        self.remarks = Some(remarks);
        self
    }
}

/// Result of a successful transfer
#[derive(Debug, Clone, Serialize)]
pub struct TransferReceipt {
    pub transaction_id: TransactionId,
    /// Caller-facing reference, e.g. `TXN000000000042`
    pub reference: String,
    pub new_balance: Decimal,
    pub amount: Decimal,
    pub beneficiary: AccountNumber,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_transfer_command_builder() {
        let source = Uuid::new_v4();
        let cmd = TransferCommand::new(
            Some(source),
            "AN9876543210".to_string(),
            "1500".to_string(),
        );

        assert_eq!(cmd.source_account_id, Some(source));
        assert!(cmd.remarks.is_none());

        let cmd = cmd.with_remarks("Rent".to_string());
        assert_eq!(cmd.remarks.as_deref(), Some("Rent"));
    }

    #[test]
    fn test_signup_command_into_profile() {
        let cmd = SignupCommand::new(
            "asha".to_string(),
            "asha@example.com".to_string(),
            "secret1".to_string(),
        );

        let profile: AccountProfile = cmd.into();
        assert_eq!(profile.email, "asha@example.com");
        assert_eq!(profile.username, "asha");
    }
}
