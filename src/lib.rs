//! ArthaNidhi Ledger Library
//!
//! In-memory account store, append-only transaction ledger and fund
//! transfer engine, plus the HTTP adapter that fronts them.

pub mod api;
pub mod config;
pub mod domain;
mod error;
pub mod handlers;
pub mod jobs;
pub mod ledger;
pub mod session;

pub use config::Config;
pub use domain::{Amount, AmountError, Balance, DomainError, ErrorKind, OperationContext};
pub use error::{AppError, AppResult, ErrorResponse};
pub use ledger::Ledger;
