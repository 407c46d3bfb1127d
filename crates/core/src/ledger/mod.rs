//! Double-entry bookkeeping logic.
//!
//! This module implements the core ledger functionality:
//! - Account and entry types with the debit/credit sign rules
//! - Balance formula shared by current and period balances
//! - Business rule validation (entry count, amounts, tolerance)
//! - Ledger service resolving entries against the chart of accounts
//! - Account statements with running balances

pub mod balance;
pub mod error;
pub mod service;
pub mod statement;
pub mod types;
pub mod validation;

#[cfg(test)]
mod service_props;

pub use balance::{BalanceTotals, NormalSide, RunningBalance, compute_balance, entry_effect};
pub use error::LedgerError;
pub use service::LedgerService;
pub use statement::{AccountStatement, StatementEntry, StatementLine, build_statement};
pub use types::{
    AccountInfo, AccountType, CreateTransactionInput, EntryType, JournalEntryInput, ResolvedEntry,
    TransactionStatus, TransactionTotals,
};
pub use validation::BALANCE_TOLERANCE;
