//! `SeaORM` entity definitions.

pub mod account_period_balances;
pub mod accounts;
pub mod balance_periods;
pub mod balance_verifications;
pub mod bank_statement_items;
pub mod bank_statements;
pub mod current_account_balances;
pub mod journal_entries;
pub mod petty_cash_accounts;
pub mod petty_cash_transactions;
pub mod reconciliation_items;
pub mod reconciliations;
pub mod sea_orm_active_enums;
pub mod transactions;
