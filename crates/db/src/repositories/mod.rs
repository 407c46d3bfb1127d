//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod account;
pub mod balance;
pub mod period;
pub mod petty_cash;
pub mod reconciliation;
pub mod transaction;

pub use account::{AccountError, AccountRepository, AccountView, CreateAccountInput};
pub use balance::{AccountBalance, BalanceCheck, BalanceError, BalanceRepository};
pub use period::{
    AccountPeriodView, PeriodRepoError, PeriodRepository, PeriodView, SetBroughtDownInput,
    VerificationView,
};
pub use petty_cash::{
    MovementMeta, PettyCashAccountView, PettyCashEntryView, PettyCashRepoError,
    PettyCashRepository, RecordedMovement,
};
pub use reconciliation::{
    BankStatementView, CreateReconciliationInput, ImportStatementInput, ReconciliationItemView,
    ReconciliationRepoError, ReconciliationRepository, ReconciliationView, StatementLineView,
};
pub use transaction::{
    EntryView, TransactionError, TransactionFilter, TransactionHeader, TransactionRepository,
    TransactionWithEntries,
};
