//! `SeaORM` Entity for icx_sicx_bnusd_quotes table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "icx_sicx_bnusd_quotes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub timestamp: DateTime,
    #[sea_orm(column_type = "Decimal(None)")]
    pub icx_usd: Decimal,
    #[sea_orm(column_type = "Decimal(None)")]
    pub sicx_bnusd: Decimal,
    #[sea_orm(column_type = "Decimal(None)")]
    pub sicx_icx: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
