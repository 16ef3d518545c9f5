//! Mirrors tracked GitHub repositories and their commits into Postgres.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use crate::config::github;
use crate::entities::{github_commits, github_repos};
use crate::error::AppResult;
use crate::models::github::{GithubCommitDetail, GithubRepo};
use crate::services::github::GithubService;

/// 2022-01-01T00:00:00Z, where commit history starts when nothing is stored.
pub const DEFAULT_COMMITS_START: i64 = 1_640_995_200;

/// Owners whose repos are synced. Unknown or missing owners mean all of them.
pub fn owners_to_sync(owner_name: Option<&str>) -> Vec<String> {
    match owner_name {
        Some(owner) if github::is_tracked_owner(owner) => vec![owner.to_lowercase()],
        _ => github::USERNAMES.iter().map(|u| u.to_string()).collect(),
    }
}

pub fn should_store(repo: &GithubRepo) -> bool {
    !github::is_ignored(repo.id) && !repo.fork
}

fn repo_model(repo: &GithubRepo, total_commits: u64) -> github_repos::ActiveModel {
    github_repos::ActiveModel {
        id: Set(repo.id),
        name: Set(repo.name.clone()),
        description: Set(repo.description.clone()),
        owner_name: Set(repo.owner_name()),
        language: Set(repo.language.clone()),
        license: Set(repo.license_name()),
        created_at: Set(repo.created_at.naive_utc()),
        updated_at: Set(repo.updated_at.naive_utc()),
        pushed_at: Set(repo.pushed_at.naive_utc()),
        total_commits: Set(total_commits as i64),
    }
}

fn commit_model(repo: &github_repos::Model, detail: GithubCommitDetail) -> github_commits::ActiveModel {
    github_commits::ActiveModel {
        sha: Set(detail.sha.clone()),
        date: Set(detail.date()),
        owner_name: Set(repo.owner_name.clone()),
        repo_id: Set(repo.id),
        repo_name: Set(repo.name.clone()),
        author_email: Set(detail.commit.author.email.clone()),
        author_id: Set(detail.author_id()),
        author_name: Set(detail.commit.author.name.clone()),
        author_username: Set(detail.author_username()),
        committer_email: Set(detail.commit.committer.email.clone()),
        committer_id: Set(detail.committer_id()),
        committer_name: Set(detail.commit.committer.name.clone()),
        committer_username: Set(detail.committer_username()),
        message: Set(detail.commit.message),
        changes_additions: Set(detail.stats.additions),
        changes_deletions: Set(detail.stats.deletions),
        changes_total: Set(detail.stats.total),
    }
}

#[derive(Clone)]
pub struct GithubSyncService {
    db: Arc<DatabaseConnection>,
    github: GithubService,
}

impl GithubSyncService {
    pub fn new(db: Arc<DatabaseConnection>, github: GithubService) -> Self {
        Self { db, github }
    }

    async fn fetch_owner_repos(&self, owner_name: &str) -> AppResult<Vec<GithubRepo>> {
        let mut repos = Vec::new();
        let mut page = 1;
        loop {
            let batch = self.github.get_repos_from_username(owner_name, page).await?;
            if batch.is_empty() {
                break;
            }
            repos.extend(batch);
            page += 1;
        }
        Ok(repos)
    }

    /// Writes repos that are new or whose push/update times moved.
    pub async fn sync_repos(&self, owner_name: Option<&str>) -> AppResult<usize> {
        let owners = owners_to_sync(owner_name);
        let mut repos = Vec::new();
        for owner in &owners {
            tracing::info!(owner = %owner, "Fetching GitHub repos");
            repos.extend(self.fetch_owner_repos(owner).await?);
        }
        if owners.len() > 1 {
            for (owner, name) in github::ADDITIONAL_REPOS {
                match self.github.get_repo(owner, name).await {
                    Ok(repo) => repos.push(repo),
                    Err(e) => tracing::warn!(owner, name, error = %e, "Failed to fetch additional repo"),
                }
            }
        }

        let stored: HashMap<i64, github_repos::Model> = github_repos::Entity::find()
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|repo| (repo.id, repo))
            .collect();

        let mut written = 0;
        for repo in repos.iter().filter(|r| should_store(r)) {
            let stale = stored
                .get(&repo.id)
                .is_none_or(|existing| repo.changed_since(existing.pushed_at, existing.updated_at));
            if !stale {
                continue;
            }

            let owner = repo.owner_name();
            let total_commits = match self
                .github
                .get_commits_count(&owner, &repo.name, None, None)
                .await
            {
                Ok(count) => count,
                Err(e) => {
                    tracing::warn!(repo = %repo.name, error = %e, "Failed to count commits");
                    0
                }
            };

            github_repos::Entity::insert(repo_model(repo, total_commits))
                .on_conflict(
                    OnConflict::column(github_repos::Column::Id)
                        .update_columns([
                            github_repos::Column::Name,
                            github_repos::Column::Description,
                            github_repos::Column::OwnerName,
                            github_repos::Column::Language,
                            github_repos::Column::License,
                            github_repos::Column::CreatedAt,
                            github_repos::Column::UpdatedAt,
                            github_repos::Column::PushedAt,
                            github_repos::Column::TotalCommits,
                        ])
                        .to_owned(),
                )
                .exec_without_returning(self.db.as_ref())
                .await?;
            tracing::debug!(id = repo.id, name = %repo.name, "GitHub repo written");
            written += 1;
        }

        tracing::info!(written, "GitHub repos sync finished");
        Ok(written)
    }

    /// Start of the commit window for `repo`: the newest stored commit, or
    /// the beginning of 2022.
    async fn latest_commit_timestamp(&self, repo: &github_repos::Model) -> AppResult<i64> {
        let latest = github_commits::Entity::find()
            .filter(github_commits::Column::RepoId.eq(repo.id))
            .order_by_desc(github_commits::Column::Date)
            .one(self.db.as_ref())
            .await?;
        Ok(latest
            .map(|commit| commit.date.and_utc().timestamp())
            .unwrap_or(DEFAULT_COMMITS_START))
    }

    /// Fetches commits for every tracked repo whose stored count in the
    /// window differs from GitHub's.
    pub async fn sync_commits(
        &self,
        owner_name: Option<&str>,
        start_timestamp: Option<i64>,
        end_timestamp: Option<i64>,
    ) -> AppResult<usize> {
        let end_timestamp = end_timestamp.unwrap_or_else(|| Utc::now().timestamp());

        let mut query = github_repos::Entity::find();
        if let Some(owner) = owner_name {
            query = query.filter(github_repos::Column::OwnerName.eq(owner.to_lowercase()));
        }
        let repos: Vec<github_repos::Model> = query
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .filter(|repo| !github::is_ignored(repo.id))
            .collect();
        tracing::info!(count = repos.len(), "Processing GitHub repos");

        let mut written = 0;
        for repo in &repos {
            let start = match start_timestamp {
                Some(ts) => ts,
                None => self.latest_commit_timestamp(repo).await?,
            };
            let (Some(start_dt), Some(end_dt)) = (
                DateTime::from_timestamp(start, 0),
                DateTime::from_timestamp(end_timestamp, 0),
            ) else {
                continue;
            };

            let stored = github_commits::Entity::find()
                .filter(github_commits::Column::RepoId.eq(repo.id))
                .filter(github_commits::Column::Date.gte(start_dt.naive_utc()))
                .filter(github_commits::Column::Date.lte(end_dt.naive_utc()))
                .count(self.db.as_ref())
                .await?;
            let on_github = self
                .github
                .get_commits_count(&repo.owner_name, &repo.name, Some(start), Some(end_timestamp))
                .await?;
            if stored == on_github {
                tracing::debug!(repo = %repo.name, stored, "Commits up to date, skipping repo");
                continue;
            }
            tracing::info!(repo = %repo.name, stored, on_github, "Syncing commits");

            let mut page = 1;
            loop {
                let summaries = self
                    .github
                    .get_commits(&repo.owner_name, &repo.name, Some(start), Some(end_timestamp), page)
                    .await?;
                if summaries.is_empty() {
                    break;
                }

                let mut models = Vec::with_capacity(summaries.len());
                for summary in summaries {
                    match self
                        .github
                        .get_commit_details(&repo.owner_name, &repo.name, &summary.sha)
                        .await
                    {
                        Ok(detail) => models.push(commit_model(repo, detail)),
                        Err(e) => tracing::warn!(sha = %summary.sha, error = %e, "Failed to fetch commit details"),
                    }
                }

                if !models.is_empty() {
                    written += models.len();
                    github_commits::Entity::insert_many(models)
                        .on_conflict(
                            OnConflict::column(github_commits::Column::Sha)
                                .update_columns([
                                    github_commits::Column::Date,
                                    github_commits::Column::OwnerName,
                                    github_commits::Column::RepoId,
                                    github_commits::Column::RepoName,
                                    github_commits::Column::AuthorEmail,
                                    github_commits::Column::AuthorId,
                                    github_commits::Column::AuthorName,
                                    github_commits::Column::AuthorUsername,
                                    github_commits::Column::CommitterEmail,
                                    github_commits::Column::CommitterId,
                                    github_commits::Column::CommitterName,
                                    github_commits::Column::CommitterUsername,
                                    github_commits::Column::Message,
                                    github_commits::Column::ChangesAdditions,
                                    github_commits::Column::ChangesDeletions,
                                    github_commits::Column::ChangesTotal,
                                ])
                                .to_owned(),
                        )
                        .exec_without_returning(self.db.as_ref())
                        .await?;
                }
                page += 1;
            }
        }

        tracing::info!(written, "GitHub commits sync finished");
        Ok(written)
    }
}
