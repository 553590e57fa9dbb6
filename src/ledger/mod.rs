//! Ledger module
//!
//! The in-memory store: account table plus transaction journal, owned by
//! one [`Ledger`] object that is constructed once and shared by reference.
//!
//! Lock order is always: account table → account mutex → journal. Account
//! registration holds the table write lock for the whole operation, so no
//! reader can observe an account without its opening entries.

mod accounts;
mod journal;

pub use accounts::AccountTable;
pub use journal::Journal;

use chrono::{DateTime, Utc};
use std::num::NonZeroU32;
use parking_lot::{Mutex, MutexGuard, RwLock};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{
    Account, AccountId, AccountNumber, AccountProfile, AccountView, Amount, Credential,
    DomainError, NewTransaction, Transaction,
};

/// Default balance seeded into a newly opened account
pub const DEFAULT_OPENING_BALANCE: NonZeroU32 = match NonZeroU32::new(10_000) {
    Some(units) => units,
    None => panic!("opening balance must be positive"),
};

/// Counterparty shown on opening credits
pub const OPENING_BENEFICIARY: &str = "ArthaNidhi Payment Bank";

/// Description of opening credits
pub const OPENING_DESCRIPTION: &str = "Account Opening Bonus";

/// Default page size for history queries
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Dashboard view of one account
#[derive(Debug, Clone, PartialEq)]
pub struct AccountSummary {
    pub account_number: AccountNumber,
    pub balance: Decimal,
    pub transactions: Vec<Transaction>,
}

/// One page of an account's history
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPage {
    pub transactions: Vec<Transaction>,
    pub total: usize,
    pub has_more: bool,
}

/// Ledger totals for health reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LedgerStats {
    pub accounts: usize,
    pub transactions: usize,
}

/// Account Store + Transaction Ledger
#[derive(Debug)]
pub struct Ledger {
    accounts: RwLock<AccountTable>,
    journal: Mutex<Journal>,
    opening_balance: Amount,
}

/// Exclusive access to one account for a check-then-act sequence.
pub(crate) struct LockedAccount<'a> {
    table: &'a AccountTable,
    account: MutexGuard<'a, Account>,
    journal: &'a Mutex<Journal>,
}

impl LockedAccount<'_> {
    pub fn account(&self) -> &Account {
        &self.account
    }

    /// The single balance mutation path
    pub fn adjust_balance(&mut self, delta: Decimal) -> Result<Decimal, DomainError> {
        self.account.apply_delta(delta)
    }

    pub fn append(&mut self, entry: NewTransaction) -> Result<Transaction, DomainError> {
        self.journal.lock().append(self.table, entry)
    }
}

impl Ledger {
    /// Create an empty ledger with the default opening balance
    pub fn new() -> Self {
        Self::with_opening_balance(Amount::from(DEFAULT_OPENING_BALANCE))
    }

    /// Create an empty ledger seeding new accounts with `opening_balance`
    pub fn with_opening_balance(opening_balance: Amount) -> Self {
        Self {
            accounts: RwLock::new(AccountTable::new()),
            journal: Mutex::new(Journal::new()),
            opening_balance,
        }
    }

    pub fn opening_balance(&self) -> Decimal {
        self.opening_balance.value()
    }

    // =========================================================================
    // Account Store
    // =========================================================================

    /// Look up an account by its credential identifier (email)
    pub fn find_by_credential(&self, email: &str) -> Option<Account> {
        self.accounts.read().find_by_credential(email)
    }

    pub fn get_account(&self, id: AccountId) -> Option<Account> {
        self.accounts.read().get(id)
    }

    /// Account view for `email` when `password` matches
    pub fn authenticate(&self, email: &str, password: &str) -> Option<AccountView> {
        self.find_by_credential(email)
            .filter(|account| account.credential().verify(password))
            .map(|account| account.view())
    }

    /// Administrative listing without credential material
    pub fn list_accounts(&self) -> Vec<AccountView> {
        self.accounts.read().views()
    }

    /// Open an account and post its opening credit as one unit.
    pub fn create_account(&self, profile: AccountProfile) -> Result<Account, DomainError> {
        let id = Uuid::new_v4();
        let opening = NewTransaction::credit(
            id,
            &self.opening_balance,
            OPENING_BENEFICIARY,
            OPENING_DESCRIPTION,
        );

        let account = self.open_with_history(
            |table| {
                if table.contains_email(&profile.email) {
                    return Err(DomainError::DuplicateAccount {
                        email: profile.email.clone(),
                    });
                }
                let account_number = table.allocate_account_number(&mut rand::thread_rng())?;
                Ok(Account::open(
                    id,
                    profile.username.as_str(),
                    Credential::new(profile.email.as_str(), &profile.password),
                    account_number,
                    Utc::now(),
                ))
            },
            vec![opening],
        )?;

        tracing::info!(
            account_id = %account.id(),
            account_number = %account.account_number(),
            opening_balance = %self.opening_balance,
            "Account opened"
        );

        Ok(account)
    }

    /// Apply `balance += delta` on account `id`.
    ///
    /// Records nothing in the journal; a caller that changes a balance
    /// through here owes the matching [`Ledger::append_transaction`].
    pub fn adjust_balance(&self, id: AccountId, delta: Decimal) -> Result<Account, DomainError> {
        self.with_account(id, |locked| {
            locked.adjust_balance(delta)?;
            Ok(locked.account().clone())
        })
    }

    /// Run `f` inside the critical section of account `id`.
    pub(crate) fn with_account<T>(
        &self,
        id: AccountId,
        f: impl FnOnce(&mut LockedAccount<'_>) -> Result<T, DomainError>,
    ) -> Result<T, DomainError> {
        let table = self.accounts.read();
        let slot = table
            .slot(id)
            .ok_or_else(|| DomainError::account_not_found(id))?;
        let mut locked = LockedAccount {
            table: &table,
            account: slot.lock(),
            journal: &self.journal,
        };
        f(&mut locked)
    }

    /// Register the account built by `build` and post `history` against it.
    /// On any failure the account and its entries are removed again.
    fn open_with_history(
        &self,
        build: impl FnOnce(&AccountTable) -> Result<Account, DomainError>,
        history: Vec<NewTransaction>,
    ) -> Result<Account, DomainError> {
        let mut table = self.accounts.write();
        let account = build(&*table)?;
        let id = account.id();
        let slot = table.insert(account)?;

        let posted = {
            let mut account = slot.lock();
            let mut journal = self.journal.lock();
            let mark = journal.len();

            let result = history.into_iter().try_for_each(|entry| {
                account.apply_delta(entry.amount())?;
                journal.append(&table, entry).map(|_| ())
            });

            match result {
                Ok(()) => Ok(account.clone()),
                Err(err) => {
                    journal.truncate(mark);
                    Err(err)
                }
            }
        };

        if posted.is_err() {
            table.remove(id);
        }
        posted
    }

    // =========================================================================
    // Transaction Ledger
    // =========================================================================

    /// Append an entry owned by an existing account
    pub fn append_transaction(&self, entry: NewTransaction) -> Result<Transaction, DomainError> {
        let table = self.accounts.read();
        let mut journal = self.journal.lock();
        journal.append(&table, entry)
    }

    /// Transactions of `account_id`, newest first. Each call returns a
    /// fresh snapshot.
    pub fn list_for_account(&self, account_id: AccountId) -> Vec<Transaction> {
        self.journal.lock().list_for_account(account_id)
    }

    /// Balance, account number and full history read under one lock
    pub fn account_summary(&self, id: AccountId) -> Result<AccountSummary, DomainError> {
        self.with_account(id, |locked| {
            let transactions = locked.journal.lock().list_for_account(id);
            Ok(AccountSummary {
                account_number: locked.account().account_number().clone(),
                balance: locked.account().balance().value(),
                transactions,
            })
        })
    }

    /// `limit` transactions starting at `offset` in `list_for_account` order
    pub fn history_page(
        &self,
        id: AccountId,
        limit: usize,
        offset: usize,
    ) -> Result<HistoryPage, DomainError> {
        let summary = self.account_summary(id)?;
        let total = summary.transactions.len();
        let transactions = summary
            .transactions
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect();

        Ok(HistoryPage {
            transactions,
            total,
            has_more: offset.saturating_add(limit) < total,
        })
    }

    #[cfg(test)]
    pub(crate) fn exhaust_sequence_for_test(&self) {
        self.journal.lock().set_next_sequence(u64::MAX);
    }

    pub fn stats(&self) -> LedgerStats {
        let table = self.accounts.read();
        let journal = self.journal.lock();
        LedgerStats {
            accounts: table.len(),
            transactions: journal.len(),
        }
    }

    // =========================================================================
    // Demo data
    // =========================================================================

    /// Seed the demo customer with back-dated history.
    pub fn seed_demo_data(&self) -> Result<Account, DomainError> {
        let id = Uuid::new_v4();
        let history = vec![
            seed_entry(id, 25_000, "2024-01-15", "Self", "Initial Deposit")?,
            seed_entry(id, -1_500, "2024-01-20", "Amazon India", "Online Purchase")?,
            seed_entry(id, 50_000, "2024-01-25", "TechCorp India Pvt Ltd", "Salary Credit")?,
        ];
        let account_number = AccountNumber::parse(DEMO_ACCOUNT_NUMBER)
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let account = self.open_with_history(
            |table| {
                if table.contains_email(DEMO_EMAIL) {
                    return Err(DomainError::DuplicateAccount {
                        email: DEMO_EMAIL.to_string(),
                    });
                }
                Ok(Account::open(
                    id,
                    DEMO_USERNAME,
                    Credential::new(DEMO_EMAIL, DEMO_PASSWORD),
                    account_number,
                    Utc::now(),
                ))
            },
            history,
        )?;

        tracing::info!(
            account_id = %account.id(),
            balance = %account.balance(),
            "Demo account seeded"
        );
        Ok(account)
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

pub const DEMO_USERNAME: &str = "demo_user";
pub const DEMO_EMAIL: &str = "demo@arthanidhi.com";
pub const DEMO_PASSWORD: &str = "demo123";
pub const DEMO_ACCOUNT_NUMBER: &str = "AN001234567890";

/// Back-dated seed entry; negative `units` are debits
fn seed_entry(
    owner: AccountId,
    units: i64,
    date: &str,
    beneficiary: &str,
    description: &str,
) -> Result<NewTransaction, DomainError> {
    let at: DateTime<Utc> = format!("{}T00:00:00Z", date)
        .parse()
        .map_err(|e: chrono::ParseError| {
            DomainError::internal(format!("bad seed date {}: {}", date, e))
        })?;
    let amount =
        Amount::from_units(units.abs()).map_err(|e| DomainError::internal(e.to_string()))?;

    let entry = if units >= 0 {
        NewTransaction::credit(owner, &amount, beneficiary, description)
    } else {
        NewTransaction::debit(owner, &amount, beneficiary, description)
    };
    Ok(entry.recorded_at(at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TransactionKind;
    use rust_decimal_macros::dec;

    fn profile(email: &str) -> AccountProfile {
        AccountProfile::new("sita", email, "password1")
    }

    fn ledger_sum(ledger: &Ledger, id: AccountId) -> Decimal {
        ledger.list_for_account(id).iter().map(Transaction::amount).sum()
    }

    #[test]
    fn test_create_account_posts_opening_credit() {
        let ledger = Ledger::new();

        let account = ledger.create_account(profile("sita@example.com")).unwrap();
        let transactions = ledger.list_for_account(account.id());

        assert_eq!(account.balance().value(), dec!(10000));
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].amount(), dec!(10000));
        assert_eq!(transactions[0].kind(), TransactionKind::Credit);
        assert_eq!(transactions[0].description(), OPENING_DESCRIPTION);
        assert_eq!(transactions[0].beneficiary(), OPENING_BENEFICIARY);
        assert!(AccountNumber::is_well_formed(account.account_number().as_str()));
    }

    #[test]
    fn test_duplicate_credential_leaves_no_trace() {
        let ledger = Ledger::new();
        ledger.create_account(profile("sita@example.com")).unwrap();
        let before = ledger.stats();

        let err = ledger.create_account(profile("sita@example.com")).unwrap_err();

        assert!(matches!(err, DomainError::DuplicateAccount { .. }));
        assert_eq!(ledger.stats(), before);
    }

    #[test]
    fn test_failed_opening_rolls_back_account() {
        let ledger = Ledger::new();
        ledger.exhaust_sequence_for_test();

        let err = ledger.create_account(profile("sita@example.com")).unwrap_err();

        assert!(err.is_fatal());
        assert!(ledger.find_by_credential("sita@example.com").is_none());
        assert_eq!(ledger.stats(), LedgerStats { accounts: 0, transactions: 0 });
    }

    #[test]
    fn test_adjust_balance() {
        let ledger = Ledger::new();
        let account = ledger.create_account(profile("sita@example.com")).unwrap();

        let updated = ledger.adjust_balance(account.id(), dec!(-2500)).unwrap();
        assert_eq!(updated.balance().value(), dec!(7500));

        let err = ledger.adjust_balance(account.id(), dec!(-7500.01)).unwrap_err();
        assert_eq!(err, DomainError::insufficient_funds(dec!(7500.01), dec!(7500)));

        let missing = Uuid::new_v4();
        assert_eq!(
            ledger.adjust_balance(missing, dec!(1)).unwrap_err(),
            DomainError::account_not_found(missing)
        );
    }

    #[test]
    fn test_append_transaction_requires_account() {
        let ledger = Ledger::new();
        let stranger = Uuid::new_v4();

        let err = ledger
            .append_transaction(NewTransaction::credit(
                stranger,
                &Amount::from_units(1).unwrap(),
                "Self",
                "Deposit",
            ))
            .unwrap_err();

        assert_eq!(err.kind(), crate::domain::ErrorKind::AccountNotFound);
    }

    #[test]
    fn test_authenticate() {
        let ledger = Ledger::new();
        let account = ledger.create_account(profile("sita@example.com")).unwrap();

        assert_eq!(
            ledger.authenticate("sita@example.com", "password1").map(|v| v.id),
            Some(account.id())
        );
        assert!(ledger.authenticate("sita@example.com", "wrong").is_none());
        assert!(ledger.authenticate("nobody@example.com", "password1").is_none());
    }

    #[test]
    fn test_history_page() {
        let ledger = Ledger::with_opening_balance(Amount::from_units(100).unwrap());
        let account = ledger.create_account(profile("sita@example.com")).unwrap();
        for _ in 0..4 {
            ledger
                .with_account(account.id(), |locked| {
                    let amount = Amount::from_units(5).unwrap();
                    locked.adjust_balance(-amount.value())?;
                    locked.append(NewTransaction::debit(account.id(), &amount, "AN9876543210", "t"))
                })
                .unwrap();
        }

        let page = ledger.history_page(account.id(), 2, 0).unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.transactions.len(), 2);
        assert!(page.has_more);

        let last = ledger.history_page(account.id(), 2, 4).unwrap();
        assert_eq!(last.transactions.len(), 1);
        assert!(!last.has_more);
        assert_eq!(last.transactions[0].amount(), dec!(100));

        assert_eq!(ledger.account_summary(account.id()).unwrap().balance, dec!(80));
        assert_eq!(ledger_sum(&ledger, account.id()), dec!(80));
    }

    #[test]
    fn test_seed_demo_data_is_consistent() {
        let ledger = Ledger::new();

        let demo = ledger.seed_demo_data().unwrap();
        let transactions = ledger.list_for_account(demo.id());

        assert_eq!(demo.account_number().as_str(), DEMO_ACCOUNT_NUMBER);
        assert_eq!(demo.balance().value(), dec!(73500));
        assert_eq!(ledger_sum(&ledger, demo.id()), dec!(73500));
        assert_eq!(transactions[0].description(), "Salary Credit");
        assert_eq!(transactions[2].description(), "Initial Deposit");
        assert!(ledger.authenticate(DEMO_EMAIL, DEMO_PASSWORD).is_some());

        assert!(matches!(
            ledger.seed_demo_data(),
            Err(DomainError::DuplicateAccount { .. })
        ));
    }

    #[test]
    fn test_list_accounts_in_creation_order() {
        let ledger = Ledger::new();
        let first = ledger.create_account(profile("a@example.com")).unwrap();
        let second = ledger.create_account(profile("b@example.com")).unwrap();

        let ids: Vec<AccountId> = ledger.list_accounts().into_iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![first.id(), second.id()]);
    }
}
