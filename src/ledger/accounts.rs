//! Account Store
//!
//! Account table with lookups by id, credential identifier and account
//! number. Each account lives behind its own mutex so balance checks and
//! writes on one account never block transfers on another.

use parking_lot::Mutex;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{Account, AccountId, AccountNumber, AccountView, DomainError};

/// Attempts at drawing a fresh account number before giving up
const ACCOUNT_NUMBER_ATTEMPTS: usize = 16;

pub(crate) type AccountSlot = Arc<Mutex<Account>>;

#[derive(Debug, Default)]
pub struct AccountTable {
    by_id: HashMap<AccountId, AccountSlot>,
    by_email: HashMap<String, AccountId>,
    by_number: HashMap<AccountNumber, AccountId>,
    /// Ids in creation order
    order: Vec<AccountId>,
}

impl AccountTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the account registered under `email`
    pub fn find_by_credential(&self, email: &str) -> Option<Account> {
        self.by_email.get(email).and_then(|id| self.get(*id))
    }

    /// Snapshot of the account with `id`
    pub fn get(&self, id: AccountId) -> Option<Account> {
        self.by_id.get(&id).map(|slot| slot.lock().clone())
    }

    pub fn contains(&self, id: AccountId) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn contains_email(&self, email: &str) -> bool {
        self.by_email.contains_key(email)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Views of all accounts in creation order
    pub fn views(&self) -> Vec<AccountView> {
        self.order
            .iter()
            .filter_map(|id| self.by_id.get(id))
            .map(|slot| slot.lock().view())
            .collect()
    }

    pub(crate) fn slot(&self, id: AccountId) -> Option<AccountSlot> {
        self.by_id.get(&id).cloned()
    }

    /// Draw an account number not used by any registered account
    pub(crate) fn allocate_account_number<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<AccountNumber, DomainError> {
        (0..ACCOUNT_NUMBER_ATTEMPTS)
            .map(|_| AccountNumber::generate(&mut *rng))
            .find(|number| !self.by_number.contains_key(number))
            .ok_or_else(|| {
                DomainError::internal(format!(
                    "no free account number after {} attempts",
                    ACCOUNT_NUMBER_ATTEMPTS
                ))
            })
    }

    /// Register a new account.
    ///
    /// A taken email is a caller error; a taken id or account number is a
    /// generator defect.
    pub(crate) fn insert(&mut self, account: Account) -> Result<AccountSlot, DomainError> {
        if self.by_email.contains_key(account.email()) {
            return Err(DomainError::DuplicateAccount {
                email: account.email().to_string(),
            });
        }
        if self.by_id.contains_key(&account.id()) {
            return Err(DomainError::internal(format!(
                "account id collision: {}",
                account.id()
            )));
        }
        if self.by_number.contains_key(account.account_number()) {
            return Err(DomainError::internal(format!(
                "account number collision: {}",
                account.account_number()
            )));
        }

        let id = account.id();
        self.by_email.insert(account.email().to_string(), id);
        self.by_number.insert(account.account_number().clone(), id);
        self.order.push(id);

        let slot = Arc::new(Mutex::new(account));
        self.by_id.insert(id, Arc::clone(&slot));
        Ok(slot)
    }

    /// Undo a registration whose opening entries could not be posted
    pub(crate) fn remove(&mut self, id: AccountId) -> Option<Account> {
        let slot = self.by_id.remove(&id)?;
        let account = slot.lock().clone();
        self.by_email.remove(account.email());
        self.by_number.remove(account.account_number());
        self.order.retain(|existing| *existing != id);
        Some(account)
    }
}
