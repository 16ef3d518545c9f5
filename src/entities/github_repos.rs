//! `SeaORM` Entity for github_repos table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "github_repos")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// Lowercased owner login.
    pub owner_name: String,
    pub language: Option<String>,
    pub license: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub pushed_at: DateTime,
    pub total_commits: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::github_commits::Entity")]
    GithubCommits,
}

impl Related<super::github_commits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GithubCommits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
