//! `SeaORM` Entity for transaction headers.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::TransactionStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub transaction_type: String,
    pub reference: Option<String>,
    pub amount_minor: i64,
    pub currency: String,
    pub description: String,
    pub transaction_date: Date,
    pub boarding_house_id: Option<Uuid>,
    pub status: TransactionStatus,
    pub created_by: Uuid,
    pub posted_at: Option<DateTimeWithTimeZone>,
    pub voided_at: Option<DateTimeWithTimeZone>,
    pub voided_by: Option<Uuid>,
    pub void_reason: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::journal_entries::Entity")]
    JournalEntries,
}

impl Related<super::journal_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
