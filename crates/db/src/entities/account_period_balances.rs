//! `SeaORM` Entity for per-account period balances (BD/CD).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "account_period_balances")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: Uuid,
    pub period_id: Uuid,
    pub balance_brought_down_minor: i64,
    pub total_debits_minor: i64,
    pub total_credits_minor: i64,
    pub balance_carried_down_minor: i64,
    pub transaction_count: i64,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
