//! Transfer Engine
//!
//! Validates a transfer request, debits the sender and records the debit
//! as one unit.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::domain::{
    format_inr, AccountNumber, Amount, AmountError, DomainError, NewTransaction,
    OperationContext,
};
use crate::ledger::Ledger;

use super::{TransferCommand, TransferReceipt};

/// Longest accepted remarks text, in characters
pub const MAX_REMARKS_CHARS: usize = 100;

// =========================================================================
// TransferEngine
// =========================================================================

/// Handler for outgoing fund transfers
pub struct TransferEngine {
    ledger: Arc<Ledger>,
}

impl TransferEngine {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self { ledger }
    }

    /// Execute the transfer command.
    ///
    /// Every rejection happens before any state change. The balance check,
    /// the debit and the ledger append run inside the sender's critical
    /// section, so two concurrent transfers can never both spend the same
    /// funds.
    pub fn execute(
        &self,
        command: TransferCommand,
        context: &OperationContext,
    ) -> Result<TransferReceipt, DomainError> {
        let result = self.try_execute(command, context);

        if let Err(err) = &result {
            if err.is_fatal() {
                tracing::error!(
                    error = %err,
                    correlation_id = ?context.correlation_id,
                    client_ip = ?context.client_ip,
                    "Transfer failed"
                );
            } else {
                tracing::info!(
                    error_code = %err.kind(),
                    correlation_id = ?context.correlation_id,
                    client_ip = ?context.client_ip,
                    "Transfer rejected"
                );
            }
        }
        result
    }

    fn try_execute(
        &self,
        command: TransferCommand,
        context: &OperationContext,
    ) -> Result<TransferReceipt, DomainError> {
        // 1. Actor
        let source_id = command
            .source_account_id
            .or(context.actor)
            .ok_or(DomainError::ActorNotFound)?;
        let source = self
            .ledger
            .get_account(source_id)
            .ok_or(DomainError::ActorNotFound)?;

        // 2. Beneficiary format
        let beneficiary_input = command.beneficiary_account_number.trim();
        let beneficiary = AccountNumber::parse(beneficiary_input).map_err(|_| {
            DomainError::InvalidBeneficiaryFormat {
                beneficiary: beneficiary_input.to_string(),
            }
        })?;

        // 3. Self transfer
        if &beneficiary == source.account_number() {
            return Err(DomainError::SelfTransferRejected);
        }

        // 4. Amount; a finite number too large to represent fails the range check
        let amount: Amount = command.amount.parse().map_err(|err| match err {
            AmountError::TooLarge(_) => DomainError::AmountOutOfRange {
                amount: Decimal::MAX,
            },
            _ => DomainError::InvalidAmount {
                input: command.amount.clone(),
            },
        })?;

        // 5. Range
        if !amount.is_within_transfer_limits() {
            return Err(DomainError::AmountOutOfRange {
                amount: amount.value(),
            });
        }

        let remarks = command.remarks.as_deref().map(str::trim).unwrap_or("");
        let remarks_chars = remarks.chars().count();
        if remarks_chars > MAX_REMARKS_CHARS {
            return Err(DomainError::RemarksTooLong {
                max: MAX_REMARKS_CHARS,
                actual: remarks_chars,
            });
        }

        let entry = NewTransaction::debit(
            source_id,
            &amount,
            beneficiary.as_str(),
            describe(&beneficiary, remarks),
        );

        // 6. Balance check, debit and record under the sender's lock
        let (transaction, new_balance) = self.ledger.with_account(source_id, |locked| {
            let available = locked.account().balance();
            if !available.is_sufficient_for(&amount) {
                return Err(DomainError::insufficient_funds(
                    amount.value(),
                    available.value(),
                ));
            }

            let new_balance = locked.adjust_balance(-amount.value())?;

            match locked.append(entry) {
                Ok(transaction) => Ok((transaction, new_balance)),
                Err(append_err) => {
                    locked.adjust_balance(amount.value()).map_err(|undo_err| {
                        DomainError::internal(format!(
                            "compensation failed after append error ({}): {}",
                            append_err, undo_err
                        ))
                    })?;
                    tracing::warn!(
                        account_id = %source_id,
                        amount = %amount,
                        error = %append_err,
                        "Debit compensated after ledger append failure"
                    );
                    Err(append_err)
                }
            }
        })?;

        tracing::info!(
            account_id = %source_id,
            transaction_id = %transaction.id(),
            amount = %amount,
            beneficiary = %beneficiary,
            new_balance = %new_balance,
            correlation_id = ?context.correlation_id,
            client_ip = ?context.client_ip,
            "Transfer executed"
        );

        Ok(TransferReceipt {
            transaction_id: transaction.id(),
            reference: transaction.id().reference(),
            new_balance,
            amount: amount.value(),
            message: format!(
                "{} transferred successfully to {}",
                format_inr(amount.value()),
                beneficiary
            ),
            beneficiary,
        })
    }
}

fn describe(beneficiary: &AccountNumber, remarks: &str) -> String {
    if remarks.is_empty() {
        format!("Transfer to {}", beneficiary)
    } else {
        format!("Transfer to {} - {}", beneficiary, remarks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccountProfile, ErrorKind};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn engine_with_account() -> (TransferEngine, Arc<Ledger>, Uuid) {
        let ledger = Arc::new(Ledger::new());
        let account = ledger
            .create_account(AccountProfile::new("kiran", "kiran@example.com", "secret1"))
            .unwrap();
        (TransferEngine::new(Arc::clone(&ledger)), ledger, account.id())
    }

    #[test]
    fn test_missing_actor_rejected() {
        let cmd = TransferCommand::new(None, " AN9876543210 ".to_string(), "10".to_string());
        let context = OperationContext::new();
        let (engine, _, _) = engine_with_account();

        assert_eq!(
            engine.execute(cmd, &context).unwrap_err(),
            DomainError::ActorNotFound
        );
    }

    #[test]
    fn test_actor_taken_from_context() {
        let (engine, _, id) = engine_with_account();
        let context = OperationContext::new().with_actor(id);
        let cmd = TransferCommand::new(None, " AN9876543210 ".to_string(), "10".to_string());

        let receipt = engine.execute(cmd, &context).unwrap();

        assert_eq!(receipt.new_balance, dec!(9990));
        assert_eq!(receipt.beneficiary.as_str(), "AN9876543210");
    }

    #[test]
    fn test_unknown_actor_rejected() {
        let (engine, _, _) = engine_with_account();
        let cmd = TransferCommand::new(
            Some(Uuid::new_v4()),
            "AN9876543210".to_string(),
            "10".to_string(),
        );

        assert_eq!(
            engine.execute(cmd, &OperationContext::new()).unwrap_err(),
            DomainError::ActorNotFound
        );
    }

    #[test]
    fn test_description_and_reference() {
        let (engine, ledger, id) = engine_with_account();
        let cmd = TransferCommand::new(Some(id), "AN9876543210".to_string(), "250".to_string())
            .with_remarks("  Rent  ".to_string());

        let receipt = engine.execute(cmd, &OperationContext::new()).unwrap();
        let latest = ledger.list_for_account(id).remove(0);

        assert_eq!(latest.description(), "Transfer to AN9876543210 - Rent");
        assert_eq!(receipt.reference, format!("TXN{:012}", latest.id().value()));
        assert_eq!(
            receipt.message,
            "₹250.00 transferred successfully to AN9876543210"
        );
    }

    #[test]
    fn test_remarks_too_long() {
        let (engine, ledger, id) = engine_with_account();
        let cmd = TransferCommand::new(Some(id), "AN9876543210".to_string(), "250".to_string())
            .with_remarks("x".repeat(MAX_REMARKS_CHARS + 1));

        let err = engine.execute(cmd, &OperationContext::new()).unwrap_err();

        assert_eq!(
            err,
            DomainError::RemarksTooLong {
                max: MAX_REMARKS_CHARS,
                actual: MAX_REMARKS_CHARS + 1
            }
        );
        assert_eq!(ledger.list_for_account(id).len(), 1);
    }

    #[test]
    fn test_invalid_amount_inputs() {
        let (engine, _, id) = engine_with_account();

        for input in ["", "abc", "0", "-5", "NaN", "1e400", "1_000"] {
            let cmd = TransferCommand::new(Some(id), "AN9876543210".to_string(), input.to_string());
            assert!(
                matches!(
                    engine.execute(cmd, &OperationContext::new()),
                    Err(DomainError::InvalidAmount { .. })
                ),
                "input {:?} should be invalid",
                input
            );
        }
    }

    #[test]
    fn test_oversized_amounts_are_out_of_range() {
        let (engine, ledger, id) = engine_with_account();

        for input in ["99999999999999999999999999999999", "1e21", "100000.01"] {
            let cmd = TransferCommand::new(Some(id), "AN9876543210".to_string(), input.to_string());
            let err = engine.execute(cmd, &OperationContext::new()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::AmountOutOfRange, "input {:?}", input);
        }
        assert_eq!(ledger.get_account(id).unwrap().balance().value(), dec!(10000));
    }

    #[test]
    fn test_failed_append_is_compensated() {
        let (engine, ledger, id) = engine_with_account();
        ledger.exhaust_sequence_for_test();

        let cmd = TransferCommand::new(Some(id), "AN9876543210".to_string(), "100".to_string());
        let err = engine.execute(cmd, &OperationContext::new()).unwrap_err();

        assert!(err.is_fatal());
        assert_eq!(ledger.get_account(id).unwrap().balance().value(), dec!(10000));
        assert_eq!(ledger.list_for_account(id).len(), 1);
    }
}
