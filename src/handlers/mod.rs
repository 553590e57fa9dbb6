//! Command Handlers module
//!
//! Handlers that orchestrate ledger operations: signup, fund transfer and
//! the advisory beneficiary lookup.

mod beneficiary;
mod commands;
mod signup_handler;
mod transfer_handler;


pub use beneficiary::{
    BeneficiaryCheck, BeneficiaryValidator, DEFAULT_ACCEPTANCE_RATE, KNOWN_BENEFICIARIES,
};
pub use commands::*;
pub use signup_handler::SignupHandler;
pub use transfer_handler::{TransferEngine, MAX_REMARKS_CHARS};
