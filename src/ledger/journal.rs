//! Transaction Ledger
//!
//! Append-only journal of transaction records. Records are never updated
//! or removed once appended; the only exception is discarding the entries
//! of an account registration that is being rolled back.

use chrono::Utc;

use crate::domain::{AccountId, DomainError, NewTransaction, Transaction, TransactionId};

use super::accounts::AccountTable;

#[derive(Debug)]
pub struct Journal {
    entries: Vec<Transaction>,
    /// Id handed to the next appended record
    next_sequence: u64,
}

impl Journal {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_sequence: 1,
        }
    }

    /// Append an entry owned by an existing account.
    pub(crate) fn append(
        &mut self,
        accounts: &AccountTable,
        entry: NewTransaction,
    ) -> Result<Transaction, DomainError> {
        if !accounts.contains(entry.owner_account_id()) {
            return Err(DomainError::account_not_found(entry.owner_account_id()));
        }

        let sequence = self.next_sequence;
        let next = sequence
            .checked_add(1)
            .ok_or_else(|| DomainError::internal("transaction sequence exhausted"))?;

        let transaction = entry.into_transaction(TransactionId::new(sequence), Utc::now());
        self.entries.push(transaction.clone());
        self.next_sequence = next;

        Ok(transaction)
    }

    /// All transactions of `account_id`, newest date first; same-date
    /// records are ordered most recent insertion first.
    pub fn list_for_account(&self, account_id: AccountId) -> Vec<Transaction> {
        let mut transactions: Vec<Transaction> = self
            .entries
            .iter()
            .filter(|txn| txn.owner_account_id() == account_id)
            .cloned()
            .collect();

        transactions.sort_by(|a, b| b.date().cmp(&a.date()).then_with(|| b.id().cmp(&a.id())));
        transactions
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop records appended after `len` while the caller still holds
    /// exclusive access to the account table.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    #[cfg(test)]
    pub(crate) fn set_next_sequence(&mut self, sequence: u64) {
        self.next_sequence = sequence;
    }
}

impl Default for Journal {
    fn default() -> Self {
        Self::new()
    }
}
