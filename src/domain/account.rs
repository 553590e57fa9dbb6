//! Account records
//!
//! An account holds the credential used to sign in, the external account
//! number and the balance. The balance changes only through
//! [`Account::apply_delta`], which the ledger calls inside the account's
//! critical section.

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::{AccountNumber, Balance, DomainError};

/// Opaque account identifier
pub type AccountId = Uuid;

/// Data supplied at signup
#[derive(Debug, Clone, Deserialize)]
pub struct AccountProfile {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl AccountProfile {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Sign-in material: the email identifier and a salted secret digest.
#[derive(Clone)]
pub struct Credential {
    email: String,
    salt: String,
    secret_digest: String,
}

impl Credential {
    pub fn new(email: impl Into<String>, password: &str) -> Self {
        let mut salt = [0u8; 16];
        rand::thread_rng().fill(&mut salt);
        let salt = hex::encode(salt);
        let secret_digest = sha256_hex(&salt, password);

        Self {
            email: email.into(),
            salt,
            secret_digest,
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Check a candidate password against the stored digest
    pub fn verify(&self, password: &str) -> bool {
        sha256_hex(&self.salt, password) == self.secret_digest
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("email", &self.email)
            .field("secret_digest", &"[REDACTED]")
            .finish()
    }
}

fn sha256_hex(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Account record
#[derive(Debug, Clone)]
pub struct Account {
    id: AccountId,
    username: String,
    credential: Credential,
    account_number: AccountNumber,
    balance: Balance,
    /// Number of balance changes applied
    version: u64,
    created_at: DateTime<Utc>,
}

impl Account {
    /// A freshly opened account has a zero balance; the opening credit is
    /// posted by the ledger together with its transaction record.
    pub fn open(
        id: AccountId,
        username: impl Into<String>,
        credential: Credential,
        account_number: AccountNumber,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            credential,
            account_number,
            balance: Balance::zero(),
            version: 0,
            created_at,
        }
    }

    /// Apply `balance += delta`, refusing to go below zero.
    pub(crate) fn apply_delta(&mut self, delta: Decimal) -> Result<Decimal, DomainError> {
        let Some(balance) = self.balance.checked_apply(delta) else {
            if delta < Decimal::ZERO {
                return Err(DomainError::insufficient_funds(-delta, self.balance.value()));
            }
            return Err(DomainError::internal(format!(
                "balance overflow on account {}",
                self.id
            )));
        };

        self.balance = balance;
        self.version += 1;
        Ok(balance.value())
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        self.credential.email()
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn account_number(&self) -> &AccountNumber {
        &self.account_number
    }

    pub fn balance(&self) -> &Balance {
        &self.balance
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Public view without credential material
    pub fn view(&self) -> AccountView {
        AccountView {
            id: self.id,
            username: self.username.clone(),
            email: self.credential.email().to_string(),
            account_number: self.account_number.clone(),
            balance: self.balance.value(),
            created_at: self.created_at,
        }
    }
}

/// Account data handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountView {
    pub id: AccountId,
    pub username: String,
    pub email: String,
    pub account_number: AccountNumber,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn test_account() -> Account {
        Account::open(
            Uuid::new_v4(),
            "priya",
            Credential::new("priya@example.com", "secret123"),
            AccountNumber::parse("AN1234567890").unwrap(),
            Utc::now(),
        )
    }

    #[test]
    fn test_account_opens_with_zero_balance() {
        let account = test_account();

        assert_eq!(account.balance().value(), Decimal::ZERO);
        assert_eq!(account.version(), 0);
        assert_eq!(account.email(), "priya@example.com");
    }

    #[test]
    fn test_apply_delta() {
        let mut account = test_account();

        assert_eq!(account.apply_delta(dec!(10000)).unwrap(), dec!(10000));
        assert_eq!(account.apply_delta(dec!(-1500)).unwrap(), dec!(8500));
        assert_eq!(account.version(), 2);
    }

    #[test]
    fn test_apply_delta_insufficient() {
        let mut account = test_account();
        account.apply_delta(dec!(500)).unwrap();

        let err = account.apply_delta(dec!(-1000)).unwrap_err();

        assert_eq!(err, DomainError::insufficient_funds(dec!(1000), dec!(500)));
        assert_eq!(account.balance().value(), dec!(500));
        assert_eq!(account.version(), 1);
    }

    #[test]
    fn test_credential_verify() {
        let credential = Credential::new("a@b.c", "hunter22");

        assert!(credential.verify("hunter22"));
        assert!(!credential.verify("hunter23"));
        assert!(!format!("{:?}", credential).contains(&credential.secret_digest));
    }

    #[test]
    fn test_credential_salts_differ() {
        let a = Credential::new("a@b.c", "same-password");
        let b = Credential::new("a@b.c", "same-password");

        assert_ne!(a.secret_digest, b.secret_digest);
    }

    #[test]
    fn test_view_hides_secret() {
        let account = test_account();
        let json = serde_json::to_string(&account.view()).unwrap();

        assert!(json.contains("AN1234567890"));
        assert!(!json.contains("secret"));
    }
}
