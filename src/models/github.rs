//! GitHub repository and commit mirrors plus the build-page aggregates.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct GithubOwner {
    pub login: String,
    #[serde(default)]
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubLicense {
    #[serde(default)]
    pub spdx_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Entry of `GET /users/{username}/repos`.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubRepo {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub owner: GithubOwner,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub license: Option<GithubLicense>,
    #[serde(default)]
    pub fork: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub pushed_at: DateTime<Utc>,
}

impl GithubRepo {
    pub fn owner_name(&self) -> String {
        self.owner.login.to_lowercase()
    }

    pub fn license_name(&self) -> Option<String> {
        self.license
            .as_ref()
            .and_then(|l| l.spdx_id.clone().or_else(|| l.name.clone()))
    }

    /// Whether the stored copy is stale. Only push and update times are compared.
    pub fn changed_since(&self, pushed_at: NaiveDateTime, updated_at: NaiveDateTime) -> bool {
        self.pushed_at.naive_utc() != pushed_at || self.updated_at.naive_utc() != updated_at
    }
}

/// `GET /orgs/{org}`.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubOrg {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub public_repos: u64,
    #[serde(default)]
    pub html_url: String,
}

impl GithubOrg {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or(&self.login)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubRelease {
    pub id: i64,
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitSignature {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitCommit {
    pub author: GitSignature,
    pub committer: GitSignature,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitStats {
    #[serde(default)]
    pub additions: i64,
    #[serde(default)]
    pub deletions: i64,
    #[serde(default)]
    pub total: i64,
}

/// Entry of `GET /repos/{owner}/{repo}/commits`.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubCommitSummary {
    pub sha: String,
}

/// `GET /repos/{owner}/{repo}/commits/{sha}`.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubCommitDetail {
    pub sha: String,
    pub commit: GitCommit,
    #[serde(default)]
    pub author: Option<GithubOwner>,
    #[serde(default)]
    pub committer: Option<GithubOwner>,
    #[serde(default)]
    pub stats: CommitStats,
}

impl GithubCommitDetail {
    /// Commit time as recorded by the committer.
    pub fn date(&self) -> NaiveDateTime {
        self.commit.committer.date.naive_utc()
    }

    pub fn author_username(&self) -> Option<String> {
        self.author.as_ref().map(|a| a.login.clone())
    }

    pub fn author_id(&self) -> i64 {
        self.author.as_ref().map(|a| a.id).unwrap_or(0)
    }

    pub fn committer_username(&self) -> Option<String> {
        self.committer.as_ref().map(|c| c.login.clone())
    }

    pub fn committer_id(&self) -> i64 {
        self.committer.as_ref().map(|c| c.id).unwrap_or(0)
    }
}

/// Chart point, `x` is the bucket label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Datapoint {
    pub x: String,
    pub y: usize,
}

/// Counts commit dates per `format` bucket. Dates must be sorted ascending;
/// consecutive equal labels form one bucket.
pub fn group_commit_dates(dates: &[NaiveDateTime], format: &str) -> Vec<Datapoint> {
    let mut datapoints: Vec<Datapoint> = Vec::new();
    for date in dates {
        let label = date.format(format).to_string();
        match datapoints.last_mut() {
            Some(last) if last.x == label => last.y += 1,
            _ => datapoints.push(Datapoint { x: label, y: 1 }),
        }
    }
    datapoints
}

pub const HOURLY_BUCKET: &str = "%Y-%m-%dT%H";
pub const MONTHLY_BUCKET: &str = "%Y-%m";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub username: String,
    pub commits: usize,
}

/// Commit counts per author, most active first. Commits without a GitHub
/// account are skipped.
pub fn commit_leaderboard<'a, I>(authors: I) -> Vec<LeaderboardEntry>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for author in authors.into_iter().flatten() {
        *counts.entry(author).or_default() += 1;
    }
    let mut entries: Vec<LeaderboardEntry> = counts
        .into_iter()
        .map(|(username, commits)| LeaderboardEntry {
            username: username.to_string(),
            commits,
        })
        .collect();
    entries.sort_by(|a, b| b.commits.cmp(&a.commits));
    entries
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerSummary {
    pub owner_name: String,
    pub repo_count: usize,
}

/// Repo counts per owner, ordered by owner name.
pub fn owner_summaries<'a, I>(owners: I) -> Vec<OwnerSummary>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for owner in owners {
        *counts.entry(owner.to_lowercase()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(owner_name, repo_count)| OwnerSummary {
            owner_name,
            repo_count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, 15, 0)
            .unwrap()
    }

    #[test]
    fn test_group_commit_dates_by_hour() {
        let dates = vec![at(1, 10), at(1, 10), at(1, 11), at(2, 9)];
        let points = group_commit_dates(&dates, HOURLY_BUCKET);
        assert_eq!(
            points,
            vec![
                Datapoint { x: "2024-03-01T10".to_string(), y: 2 },
                Datapoint { x: "2024-03-01T11".to_string(), y: 1 },
                Datapoint { x: "2024-03-02T09".to_string(), y: 1 },
            ]
        );
        let monthly = group_commit_dates(&dates, MONTHLY_BUCKET);
        assert_eq!(monthly, vec![Datapoint { x: "2024-03".to_string(), y: 4 }]);
        assert!(group_commit_dates(&[], MONTHLY_BUCKET).is_empty());
    }

    #[test]
    fn test_leaderboard_and_owners() {
        let board = commit_leaderboard(vec![Some("alice"), Some("bob"), None, Some("bob")]);
        assert_eq!(board[0], LeaderboardEntry { username: "bob".to_string(), commits: 2 });
        assert_eq!(board.len(), 2);

        let owners = owner_summaries(vec!["Geometrylabs", "geometrylabs", "rhizome"]);
        assert_eq!(owners[0].owner_name, "geometrylabs");
        assert_eq!(owners[0].repo_count, 2);
    }

    #[test]
    fn test_commit_detail_without_accounts() {
        let detail: GithubCommitDetail = serde_json::from_value(json!({
            "sha": "abc",
            "commit": {
                "author": { "name": "A", "email": "a@x", "date": "2024-03-01T10:00:00Z" },
                "committer": { "name": "C", "email": "c@x", "date": "2024-03-01T11:00:00Z" },
                "message": "fix"
            },
            "author": null,
            "committer": { "login": "octo", "id": 9 },
            "stats": { "additions": 3, "deletions": 1, "total": 4 }
        }))
        .unwrap();
        assert_eq!(detail.author_username(), None);
        assert_eq!(detail.author_id(), 0);
        assert_eq!(detail.committer_id(), 9);
        assert_eq!(detail.date(), at(1, 11) - chrono::Duration::minutes(15));
        assert_eq!(detail.stats.total, 4);
    }

    #[test]
    fn test_repo_change_detection() {
        let repo: GithubRepo = serde_json::from_value(json!({
            "id": 1,
            "name": "tracker",
            "owner": { "login": "Rhizome" },
            "fork": false,
            "license": { "spdx_id": "MIT", "name": "MIT License" },
            "created_at": "2022-01-01T00:00:00Z",
            "updated_at": "2024-03-01T10:15:00Z",
            "pushed_at": "2024-03-01T10:15:00Z"
        }))
        .unwrap();
        assert_eq!(repo.owner_name(), "rhizome");
        assert_eq!(repo.license_name().as_deref(), Some("MIT"));
        assert!(!repo.changed_since(at(1, 10), at(1, 10)));
        assert!(repo.changed_since(at(1, 10), at(2, 10)));
    }
}
