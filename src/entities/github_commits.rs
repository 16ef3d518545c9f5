//! `SeaORM` Entity for github_commits table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "github_commits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub sha: String,
    pub date: DateTime,
    pub owner_name: String,
    pub repo_id: i64,
    pub repo_name: String,
    pub author_email: String,
    pub author_id: i64,
    pub author_name: String,
    pub author_username: Option<String>,
    pub committer_email: String,
    pub committer_id: i64,
    pub committer_name: String,
    pub committer_username: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub changes_additions: i64,
    pub changes_deletions: i64,
    pub changes_total: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::github_repos::Entity",
        from = "Column::RepoId",
        to = "super::github_repos::Column::Id"
    )]
    GithubRepos,
}

impl Related<super::github_repos::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GithubRepos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
