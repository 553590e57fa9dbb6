//! Transaction records
//!
//! Transactions are immutable facts about a balance change on the owning
//! account. The sign of `amount` is the only source of truth for the
//! credit/debit kind.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{AccountId, Amount};

/// Sequence-assigned transaction id; larger ids were created later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(u64);

impl TransactionId {
    pub(crate) fn new(sequence: u64) -> Self {
        Self(sequence)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Caller-facing reference, e.g. `TXN000000000042`
    pub fn reference(&self) -> String {
        format!("TXN{:012}", self.0)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction of a transaction relative to its owning account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Credit,
    Debit,
}

impl TransactionKind {
    /// `amount >= 0` is a credit, anything else a debit
    pub fn of(amount: Decimal) -> Self {
        if amount >= Decimal::ZERO {
            TransactionKind::Credit
        } else {
            TransactionKind::Debit
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Credit => write!(f, "credit"),
            TransactionKind::Debit => write!(f, "debit"),
        }
    }
}

/// Entry to be appended to the ledger. The ledger assigns id and date.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    owner_account_id: AccountId,
    amount: Decimal,
    beneficiary: String,
    description: String,
    recorded_at: Option<DateTime<Utc>>,
}

impl NewTransaction {
    /// Entry that increases the owner's balance by `amount`
    pub fn credit(
        owner_account_id: AccountId,
        amount: &Amount,
        beneficiary: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            owner_account_id,
            amount: amount.value(),
            beneficiary: beneficiary.into(),
            description: description.into(),
            recorded_at: None,
        }
    }

    /// Entry that decreases the owner's balance by `amount`
    pub fn debit(
        owner_account_id: AccountId,
        amount: &Amount,
        beneficiary: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            owner_account_id,
            amount: -amount.value(),
            beneficiary: beneficiary.into(),
            description: description.into(),
            recorded_at: None,
        }
    }

    /// Back-date the entry (seed data only)
    pub(crate) fn recorded_at(mut self, at: DateTime<Utc>) -> Self {
        self.recorded_at = Some(at);
        self
    }

    pub fn owner_account_id(&self) -> AccountId {
        self.owner_account_id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn kind(&self) -> TransactionKind {
        TransactionKind::of(self.amount)
    }

    pub(crate) fn into_transaction(self, id: TransactionId, now: DateTime<Utc>) -> Transaction {
        Transaction {
            id,
            owner_account_id: self.owner_account_id,
            created_at: self.recorded_at.unwrap_or(now),
            amount: self.amount,
            beneficiary: self.beneficiary,
            description: self.description,
        }
    }
}

/// Stored transaction record
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    id: TransactionId,
    owner_account_id: AccountId,
    created_at: DateTime<Utc>,
    amount: Decimal,
    beneficiary: String,
    description: String,
}

impl Transaction {
    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn owner_account_id(&self) -> AccountId {
        self.owner_account_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Calendar date used for display and ordering
    pub fn date(&self) -> NaiveDate {
        self.created_at.date_naive()
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn kind(&self) -> TransactionKind {
        TransactionKind::of(self.amount)
    }

    pub fn beneficiary(&self) -> &str {
        &self.beneficiary
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[test]
    fn test_kind_follows_sign() {
        let owner = Uuid::new_v4();
        let amount = Amount::new(dec!(1500)).unwrap();

        let credit = NewTransaction::credit(owner, &amount, "Self", "Deposit");
        let debit = NewTransaction::debit(owner, &amount, "AN9876543210", "Transfer");

        assert_eq!(credit.amount(), dec!(1500));
        assert_eq!(credit.kind(), TransactionKind::Credit);
        assert_eq!(debit.amount(), dec!(-1500));
        assert_eq!(debit.kind(), TransactionKind::Debit);
    }

    #[test]
    fn test_into_transaction_keeps_backdated_timestamp() {
        let at = "2024-01-15T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let entry = NewTransaction::credit(
            Uuid::new_v4(),
            &Amount::from_units(25000).unwrap(),
            "Self",
            "Initial Deposit",
        )
        .recorded_at(at);

        let txn = entry.into_transaction(TransactionId::new(7), Utc::now());

        assert_eq!(txn.date(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(txn.id().reference(), "TXN000000000007");
    }

    #[test]
    fn test_kind_serialization() {
        assert_eq!(serde_json::to_string(&TransactionKind::Debit).unwrap(), r#""debit""#);
        assert_eq!(TransactionKind::Credit.to_string(), "credit");
    }
}
