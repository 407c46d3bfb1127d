//! `SeaORM` active enums, stored as short strings so the schema stays portable.

use lodgebook_core::{ledger, petty_cash, reconciliation};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum AccountType {
    #[sea_orm(string_value = "asset")]
    Asset,
    #[sea_orm(string_value = "liability")]
    Liability,
    #[sea_orm(string_value = "equity")]
    Equity,
    #[sea_orm(string_value = "revenue")]
    Revenue,
    #[sea_orm(string_value = "expense")]
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum EntryType {
    #[sea_orm(string_value = "debit")]
    Debit,
    #[sea_orm(string_value = "credit")]
    Credit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum TransactionStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "posted")]
    Posted,
    #[sea_orm(string_value = "voided")]
    Voided,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum ItemSource {
    #[sea_orm(string_value = "book")]
    Book,
    #[sea_orm(string_value = "bank")]
    Bank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum ReconciliationStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "reconciled")]
    Reconciled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum PettyCashTransactionType {
    #[sea_orm(string_value = "cash_inflow")]
    CashInflow,
    #[sea_orm(string_value = "cash_outflow")]
    CashOutflow,
    #[sea_orm(string_value = "expense")]
    Expense,
    #[sea_orm(string_value = "student_payment")]
    StudentPayment,
    #[sea_orm(string_value = "beginning_balance")]
    BeginningBalance,
}

/// Maps a stored enum onto its domain twin and back.
macro_rules! mirror_enum {
    ($db:ident <=> $domain:path { $($variant:ident),+ $(,)? }) => {
        impl From<$db> for $domain {
            fn from(value: $db) -> Self {
                match value {
                    $($db::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$domain> for $db {
            fn from(value: $domain) -> Self {
                type Domain = $domain;
                match value {
                    $(Domain::$variant => Self::$variant,)+
                }
            }
        }
    };
}

mirror_enum!(AccountType <=> ledger::AccountType { Asset, Liability, Equity, Revenue, Expense });
mirror_enum!(EntryType <=> ledger::EntryType { Debit, Credit });
mirror_enum!(TransactionStatus <=> ledger::TransactionStatus { Draft, Posted, Voided });
mirror_enum!(ItemSource <=> reconciliation::ItemSource { Book, Bank });
mirror_enum!(ReconciliationStatus <=> reconciliation::ReconciliationStatus { Pending, Reconciled });
mirror_enum!(PettyCashTransactionType <=> petty_cash::PettyCashTransactionType {
    CashInflow,
    CashOutflow,
    Expense,
    StudentPayment,
    BeginningBalance,
});

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use sea_orm::Iterable;

    use super::*;

    #[test]
    fn test_round_trip_through_domain() {
        for db in AccountType::iter() {
            let domain: ledger::AccountType = db.into();
            assert_eq!(AccountType::from(domain), db);
            assert_eq!(db.to_value(), domain.as_str());
        }
    }

    #[rstest]
    #[case(EntryType::Credit.to_value(), "credit")]
    #[case(TransactionStatus::Voided.to_value(), "voided")]
    #[case(ItemSource::Bank.to_value(), "bank")]
    #[case(ReconciliationStatus::Reconciled.to_value(), "reconciled")]
    #[case(PettyCashTransactionType::CashOutflow.to_value(), "cash_outflow")]
    #[case(PettyCashTransactionType::StudentPayment.to_value(), "student_payment")]
    #[case(PettyCashTransactionType::BeginningBalance.to_value(), "beginning_balance")]
    fn test_stored_values(#[case] stored: String, #[case] expected: &str) {
        assert_eq!(stored, expected);
    }
}
