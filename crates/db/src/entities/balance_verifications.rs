//! `SeaORM` Entity for the append-only BD adjustment log.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "balance_verifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: Uuid,
    pub period_id: Uuid,
    pub previous_balance_minor: i64,
    pub new_balance_minor: i64,
    pub adjustment_amount_minor: i64,
    pub reason: Option<String>,
    pub verified_by: Uuid,
    pub verified_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
