//! Signup Handler
//!
//! Front door of account creation: field validation in front of
//! [`Ledger::create_account`].

use std::sync::Arc;

use crate::domain::{AccountView, DomainError, OperationContext};
use crate::ledger::Ledger;

use super::SignupCommand;

const MIN_USERNAME_CHARS: usize = 3;
const MIN_PASSWORD_CHARS: usize = 6;

/// Handler for account signup
pub struct SignupHandler {
    ledger: Arc<Ledger>,
}

impl SignupHandler {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self { ledger }
    }

    /// Execute the signup command
    pub fn execute(
        &self,
        command: SignupCommand,
        context: &OperationContext,
    ) -> Result<AccountView, DomainError> {
        // Duplicate identifier wins over field validation
        if self.ledger.find_by_credential(&command.email).is_some() {
            tracing::info!(
                correlation_id = ?context.correlation_id,
                client_ip = ?context.client_ip,
                "Signup rejected: duplicate email"
            );
            return Err(DomainError::DuplicateAccount {
                email: command.email,
            });
        }

        validate_profile(&command)?;

        let account = self.ledger.create_account(command.into())?;

        tracing::info!(
            account_id = %account.id(),
            correlation_id = ?context.correlation_id,
            client_ip = ?context.client_ip,
            "Signup completed"
        );

        Ok(account.view())
    }
}

fn validate_profile(command: &SignupCommand) -> Result<(), DomainError> {
    if command.username.trim().chars().count() < MIN_USERNAME_CHARS {
        return Err(DomainError::InvalidProfile(format!(
            "Username must be at least {} characters long.",
            MIN_USERNAME_CHARS
        )));
    }
    if !command.email.contains('@') {
        return Err(DomainError::InvalidProfile(
            "Please enter a valid email address.".to_string(),
        ));
    }
    if command.password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(DomainError::InvalidProfile(format!(
            "Password must be at least {} characters long.",
            MIN_PASSWORD_CHARS
        )));
    }
    Ok(())
}
