//! `SeaORM` Entity for bank reconciliations.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::ReconciliationStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "reconciliations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: Uuid,
    pub reconciliation_date: Date,
    pub statement_id: Option<Uuid>,
    pub book_balance_minor: i64,
    pub bank_balance_minor: i64,
    pub difference_minor: i64,
    pub status: ReconciliationStatus,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub reconciled_by: Option<Uuid>,
    pub reconciled_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::reconciliation_items::Entity")]
    ReconciliationItems,
}

impl Related<super::reconciliation_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReconciliationItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
