//! `SeaORM` Entity for balanced_loans table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "balanced_loans")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub pos_id: i64,
    pub address: String,
    pub created: DateTime,
    #[sea_orm(column_type = "Decimal(None)")]
    pub collateral: Decimal,
    #[sea_orm(column_type = "Decimal(None)")]
    pub ratio: Decimal,
    #[sea_orm(column_type = "Decimal(None)")]
    pub total_debt: Decimal,
    pub standing: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub assets: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub holdings: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub standings: Json,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
