//! `SeaORM` Entity for petty-cash boxes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "petty_cash_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub boarding_house_id: Uuid,
    pub current_balance_minor: i64,
    pub beginning_balance_minor: i64,
    pub total_inflows_minor: i64,
    pub total_outflows_minor: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::petty_cash_transactions::Entity")]
    PettyCashTransactions,
}

impl Related<super::petty_cash_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PettyCashTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
