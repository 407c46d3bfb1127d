//! `SeaORM` Entity for bank statement lines.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "bank_statement_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub statement_id: Uuid,
    pub position: i32,
    pub bank_date: Date,
    pub description: String,
    pub reference: Option<String>,
    pub debit_amount_minor: i64,
    pub credit_amount_minor: i64,
    pub balance_minor: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bank_statements::Entity",
        from = "Column::StatementId",
        to = "super::bank_statements::Column::Id"
    )]
    BankStatements,
}

impl Related<super::bank_statements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankStatements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
