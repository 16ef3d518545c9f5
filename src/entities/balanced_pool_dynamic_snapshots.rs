//! `SeaORM` Entity for balanced_pool_dynamic_snapshots table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "balanced_pool_dynamic_snapshots")]
pub struct Model {
    /// UTC, truncated to the minute.
    #[sea_orm(primary_key, auto_increment = false)]
    pub timestamp: DateTime,
    pub block_height: i64,
    /// Array of per-pool dynamic data.
    #[sea_orm(column_type = "JsonBinary")]
    pub data: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
