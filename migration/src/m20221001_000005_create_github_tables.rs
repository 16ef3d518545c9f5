use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GithubRepos::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GithubRepos::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GithubRepos::Name).string().not_null())
                    .col(ColumnDef::new(GithubRepos::Description).text().null())
                    .col(ColumnDef::new(GithubRepos::OwnerName).string().not_null())
                    .col(ColumnDef::new(GithubRepos::Language).string().null())
                    .col(ColumnDef::new(GithubRepos::License).string().null())
                    .col(ColumnDef::new(GithubRepos::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(GithubRepos::UpdatedAt).timestamp().not_null())
                    .col(ColumnDef::new(GithubRepos::PushedAt).timestamp().not_null())
                    .col(
                        ColumnDef::new(GithubRepos::TotalCommits)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_github_repos_owner_name")
                    .table(GithubRepos::Table)
                    .col(GithubRepos::OwnerName)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GithubCommits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GithubCommits::Sha)
                            .string_len(40)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GithubCommits::Date).timestamp().not_null())
                    .col(ColumnDef::new(GithubCommits::OwnerName).string().not_null())
                    .col(ColumnDef::new(GithubCommits::RepoId).big_integer().not_null())
                    .col(ColumnDef::new(GithubCommits::RepoName).string().not_null())
                    .col(ColumnDef::new(GithubCommits::AuthorEmail).string().not_null())
                    .col(
                        ColumnDef::new(GithubCommits::AuthorId)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(GithubCommits::AuthorName).string().not_null())
                    .col(ColumnDef::new(GithubCommits::AuthorUsername).string().null())
                    .col(ColumnDef::new(GithubCommits::CommitterEmail).string().not_null())
                    .col(
                        ColumnDef::new(GithubCommits::CommitterId)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(GithubCommits::CommitterName).string().not_null())
                    .col(ColumnDef::new(GithubCommits::CommitterUsername).string().null())
                    .col(ColumnDef::new(GithubCommits::Message).text().not_null())
                    .col(ColumnDef::new(GithubCommits::ChangesAdditions).big_integer().not_null())
                    .col(ColumnDef::new(GithubCommits::ChangesDeletions).big_integer().not_null())
                    .col(ColumnDef::new(GithubCommits::ChangesTotal).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // Charts scan by date, the sync compares counts per repo
        manager
            .create_index(
                Index::create()
                    .name("idx_github_commits_date")
                    .table(GithubCommits::Table)
                    .col(GithubCommits::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_github_commits_repo_date")
                    .table(GithubCommits::Table)
                    .col(GithubCommits::RepoId)
                    .col((GithubCommits::Date, IndexOrder::Desc))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GithubCommits::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GithubRepos::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum GithubRepos {
    Table,
    Id,
    Name,
    Description,
    OwnerName,
    Language,
    License,
    CreatedAt,
    UpdatedAt,
    PushedAt,
    TotalCommits,
}

#[derive(Iden)]
enum GithubCommits {
    Table,
    Sha,
    Date,
    OwnerName,
    RepoId,
    RepoName,
    AuthorEmail,
    AuthorId,
    AuthorName,
    AuthorUsername,
    CommitterEmail,
    CommitterId,
    CommitterName,
    CommitterUsername,
    Message,
    ChangesAdditions,
    ChangesDeletions,
    ChangesTotal,
}
