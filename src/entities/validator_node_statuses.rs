//! `SeaORM` Entity for validator_node_statuses table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "validator_node_statuses")]
pub struct Model {
    /// Validator address, not the node address.
    #[sea_orm(primary_key, auto_increment = false)]
    pub address: String,
    pub timestamp: DateTime,
    pub status: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
