//! Petty-cash subledger.
//!
//! Each box belongs to one user and boarding house and mirrors every
//! movement into the main ledger's Petty Cash account.

pub mod error;
pub mod service;
pub mod types;

pub use error::PettyCashError;
pub use service::PettyCashService;
pub use types::{
    CounterpartyRule, LedgerCodes, MovementPlan, PettyCashMovement, PettyCashState,
    PettyCashTransactionType,
};
