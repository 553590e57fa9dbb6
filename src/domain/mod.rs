//! Domain module
//!
//! Core domain types and business rules.

pub mod account;
pub mod account_number;
pub mod amount;
pub mod context;
pub mod error;
pub mod transaction;

pub use account::{Account, AccountId, AccountProfile, AccountView, Credential};
pub use account_number::{AccountNumber, AccountNumberError};
pub use amount::{format_inr, Amount, AmountError, Balance};
pub use context::OperationContext;
pub use error::{DomainError, ErrorKind};
pub use transaction::{NewTransaction, Transaction, TransactionId, TransactionKind};
