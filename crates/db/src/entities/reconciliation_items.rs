//! `SeaORM` Entity for reconciliation items (book and bank side).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::ItemSource;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "reconciliation_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub reconciliation_id: Uuid,
    pub source: ItemSource,
    pub journal_entry_id: Option<Uuid>,
    pub bank_statement_item_id: Option<Uuid>,
    pub position: i32,
    pub item_date: Date,
    pub description: String,
    pub reference: Option<String>,
    pub amount_minor: i64,
    pub is_reconciled: bool,
    pub matched_with: Option<Uuid>,
    pub match_confidence_pct: Option<i32>,
    pub match_reason: Option<String>,
    pub matched_at: Option<DateTimeWithTimeZone>,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::reconciliations::Entity",
        from = "Column::ReconciliationId",
        to = "super::reconciliations::Column::Id"
    )]
    Reconciliations,
}

impl Related<super::reconciliations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reconciliations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
