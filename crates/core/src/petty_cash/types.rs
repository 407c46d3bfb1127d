//! Petty-cash subledger types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of subledger movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PettyCashTransactionType {
    /// Cash topped up from another asset.
    CashInflow,
    /// Cash moved back to another asset.
    CashOutflow,
    /// Cash spent on an expense.
    Expense,
    /// Cash received from a student.
    StudentPayment,
    /// Opening balance of the box.
    BeginningBalance,
}

impl PettyCashTransactionType {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CashInflow => "cash_inflow",
            Self::CashOutflow => "cash_outflow",
            Self::Expense => "expense",
            Self::StudentPayment => "student_payment",
            Self::BeginningBalance => "beginning_balance",
        }
    }

    /// Whether the movement adds cash to the box.
    #[must_use]
    pub const fn is_inflow(self) -> bool {
        matches!(
            self,
            Self::CashInflow | Self::StudentPayment | Self::BeginningBalance
        )
    }
}

/// Running totals of one petty-cash box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PettyCashState {
    /// Cash currently in the box.
    pub current_balance: Decimal,
    /// Opening balance set once.
    pub beginning_balance: Decimal,
    /// Σ inflows, beginning balance excluded.
    pub total_inflows: Decimal,
    /// Σ outflows.
    pub total_outflows: Decimal,
    /// Subledger rows so far.
    pub transaction_count: u64,
}

/// A requested movement, before any rule is checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PettyCashMovement {
    /// Dr Petty Cash / Cr source asset.
    AddCash {
        /// Amount moved.
        amount: Decimal,
        /// Asset account the cash comes from.
        source_account_code: String,
        /// Optional narrative.
        description: Option<String>,
    },
    /// Dr destination asset / Cr Petty Cash.
    Withdraw {
        /// Amount moved.
        amount: Decimal,
        /// Asset account receiving the cash.
        destination_account_code: String,
        /// Optional narrative.
        description: Option<String>,
    },
    /// Dr expense / Cr Petty Cash.
    Expense {
        /// Amount spent.
        amount: Decimal,
        /// Expense account; the uncategorized account when absent.
        expense_account_code: Option<String>,
        /// Optional narrative.
        description: Option<String>,
    },
    /// Dr Petty Cash / Cr revenue.
    StudentPayment {
        /// Amount received.
        amount: Decimal,
        /// Revenue account credited.
        revenue_account_code: String,
        /// Optional narrative.
        description: Option<String>,
    },
    /// Dr Petty Cash / Cr offset.
    BeginningBalance {
        /// Opening amount.
        amount: Decimal,
        /// Usually an equity account.
        offset_account_code: String,
        /// Optional narrative.
        description: Option<String>,
    },
}

/// What the counterparty account of a movement must be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterpartyRule {
    /// A non-category asset holding at least the moved amount.
    FundedAsset,
    /// A non-category asset.
    Asset,
    /// A non-category expense account.
    Expense,
    /// A non-category revenue account.
    Revenue,
    /// Any non-category account.
    Any,
}

/// Main-ledger account codes the subledger posts against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerCodes {
    /// The main-ledger Petty Cash account.
    pub petty_cash_code: String,
    /// Fallback for expenses recorded without an account.
    pub uncategorized_expense_code: String,
}

/// A fully checked movement, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementPlan {
    /// Subledger row type.
    pub transaction_type: PettyCashTransactionType,
    /// Rounded amount.
    pub amount: Decimal,
    /// Main-ledger account debited.
    pub debit_code: String,
    /// Main-ledger account credited.
    pub credit_code: String,
    /// The non-petty-cash side.
    pub counterparty_code: String,
    /// Rule the counterparty must satisfy.
    pub counterparty_rule: CounterpartyRule,
    /// Narrative for both ledgers.
    pub description: String,
    /// Box totals after the movement.
    pub new_state: PettyCashState,
}
