//! `SeaORM` Entity for petty-cash movements.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::PettyCashTransactionType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "petty_cash_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub petty_cash_account_id: Uuid,
    pub transaction_type: PettyCashTransactionType,
    pub amount_minor: i64,
    pub description: String,
    pub reference: Option<String>,
    pub ledger_transaction_id: Option<Uuid>,
    pub transaction_date: Date,
    pub balance_after_minor: i64,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::petty_cash_accounts::Entity",
        from = "Column::PettyCashAccountId",
        to = "super::petty_cash_accounts::Column::Id"
    )]
    PettyCashAccounts,
}

impl Related<super::petty_cash_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PettyCashAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
