//! `SeaORM` Entity for imported bank statements.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "bank_statements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: Uuid,
    pub statement_date: Date,
    pub opening_balance_minor: i64,
    pub closing_balance_minor: i64,
    pub file_reference: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bank_statement_items::Entity")]
    BankStatementItems,
}

impl Related<super::bank_statement_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankStatementItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
