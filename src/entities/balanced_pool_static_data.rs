//! `SeaORM` Entity for balanced_pool_static_data table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "balanced_pool_static_data")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub base_decimals: i32,
    pub base_name: String,
    pub base_token: Option<String>,
    pub base_symbol: String,
    #[sea_orm(column_type = "Decimal(None)")]
    pub min_quote: Decimal,
    pub pool_name: String,
    pub quote_decimals: i32,
    pub quote_name: String,
    pub quote_token: Option<String>,
    pub quote_symbol: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
