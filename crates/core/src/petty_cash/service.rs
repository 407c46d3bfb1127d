//! Petty-cash movement planning.
//!
//! Every movement is planned here in full (accounts, amount, new totals)
//! before the db crate writes the ledger transaction and the subledger row in
//! one unit of work.

use lodgebook_shared::types::round_money;
use rust_decimal::Decimal;

use super::error::PettyCashError;
use super::types::{
    CounterpartyRule, LedgerCodes, MovementPlan, PettyCashMovement, PettyCashState,
    PettyCashTransactionType,
};
use crate::ledger::{AccountInfo, AccountType};

/// Stateless petty-cash rules.
pub struct PettyCashService;

impl PettyCashService {
    /// Plans a movement against the current box totals.
    pub fn plan(
        movement: PettyCashMovement,
        state: &PettyCashState,
        codes: &LedgerCodes,
    ) -> Result<MovementPlan, PettyCashError> {
        let petty = codes.petty_cash_code.clone();

        let (transaction_type, amount, counterparty_code, rule, description) = match movement {
            PettyCashMovement::AddCash {
                amount,
                source_account_code,
                description,
            } => (
                PettyCashTransactionType::CashInflow,
                amount,
                source_account_code,
                CounterpartyRule::FundedAsset,
                description,
            ),
            PettyCashMovement::Withdraw {
                amount,
                destination_account_code,
                description,
            } => (
                PettyCashTransactionType::CashOutflow,
                amount,
                destination_account_code,
                CounterpartyRule::Asset,
                description,
            ),
            PettyCashMovement::Expense {
                amount,
                expense_account_code,
                description,
            } => (
                PettyCashTransactionType::Expense,
                amount,
                expense_account_code.unwrap_or_else(|| codes.uncategorized_expense_code.clone()),
                CounterpartyRule::Expense,
                description,
            ),
            PettyCashMovement::StudentPayment {
                amount,
                revenue_account_code,
                description,
            } => (
                PettyCashTransactionType::StudentPayment,
                amount,
                revenue_account_code,
                CounterpartyRule::Revenue,
                description,
            ),
            PettyCashMovement::BeginningBalance {
                amount,
                offset_account_code,
                description,
            } => {
                if state.transaction_count > 0 {
                    return Err(PettyCashError::BeginningBalanceLocked);
                }
                (
                    PettyCashTransactionType::BeginningBalance,
                    amount,
                    offset_account_code,
                    CounterpartyRule::Any,
                    description,
                )
            }
        };

        // Dr and Cr on the same account would move the box but not the ledger.
        if counterparty_code.trim() == petty {
            return Err(PettyCashError::SameAccount(petty));
        }

        let amount = round_money(amount);
        if amount <= Decimal::ZERO {
            return Err(PettyCashError::InvalidAmount(amount));
        }

        let mut new_state = PettyCashState {
            transaction_count: state.transaction_count + 1,
            ..*state
        };
        if transaction_type.is_inflow() {
            new_state.current_balance += amount;
            if transaction_type == PettyCashTransactionType::BeginningBalance {
                new_state.beginning_balance = amount;
            } else {
                new_state.total_inflows += amount;
            }
        } else {
            if state.current_balance < amount {
                return Err(PettyCashError::InsufficientFunds {
                    available: state.current_balance,
                    requested: amount,
                });
            }
            new_state.current_balance -= amount;
            new_state.total_outflows += amount;
        }

        let (debit_code, credit_code) = if transaction_type.is_inflow() {
            (petty, counterparty_code.clone())
        } else {
            (counterparty_code.clone(), petty)
        };

        Ok(MovementPlan {
            transaction_type,
            amount,
            debit_code,
            credit_code,
            counterparty_code,
            counterparty_rule: rule,
            description: description.unwrap_or_else(|| default_description(transaction_type)),
            new_state,
        })
    }

    /// Checks the counterparty account against the plan's rule.
    ///
    /// `balance` is the counterparty's current main-ledger balance; only the
    /// funded-asset rule reads it.
    pub fn check_counterparty(
        plan: &MovementPlan,
        account: &AccountInfo,
        balance: Decimal,
    ) -> Result<(), PettyCashError> {
        if account.is_category {
            return Err(PettyCashError::CategoryAccount(account.code.clone()));
        }

        let wrong = |expected: &'static str| PettyCashError::WrongAccountType {
            code: account.code.clone(),
            expected,
        };

        match plan.counterparty_rule {
            CounterpartyRule::FundedAsset => {
                if account.account_type != AccountType::Asset {
                    return Err(wrong("an asset account"));
                }
                if balance < plan.amount {
                    return Err(PettyCashError::InsufficientFunds {
                        available: balance,
                        requested: plan.amount,
                    });
                }
            }
            CounterpartyRule::Asset if account.account_type != AccountType::Asset => {
                return Err(wrong("an asset account"));
            }
            CounterpartyRule::Expense if account.account_type != AccountType::Expense => {
                return Err(wrong("an expense account"));
            }
            CounterpartyRule::Revenue if account.account_type != AccountType::Revenue => {
                return Err(wrong("a revenue account"));
            }
            _ => {}
        }

        Ok(())
    }
}

fn default_description(transaction_type: PettyCashTransactionType) -> String {
    match transaction_type {
        PettyCashTransactionType::CashInflow => "Petty cash top-up",
        PettyCashTransactionType::CashOutflow => "Petty cash withdrawal",
        PettyCashTransactionType::Expense => "Petty cash expense",
        PettyCashTransactionType::StudentPayment => "Student payment received in cash",
        PettyCashTransactionType::BeginningBalance => "Petty cash beginning balance",
    }
    .to_string()
}
