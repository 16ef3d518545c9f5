//! GitHub REST API client.

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat};
use futures_util::stream::{self, StreamExt};
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, LINK};

use crate::error::{AppError, AppResult};
use crate::models::github::{
    GithubCommitDetail, GithubCommitSummary, GithubOrg, GithubRelease, GithubRepo,
};
use crate::services::http_request::HttpReq;

pub const GITHUB_API_URL: &str = "https://api.github.com";
const PER_PAGE: u32 = 100;

lazy_static! {
    static ref LAST_PAGE_REGEX: Regex =
        Regex::new(r#"<[^>]*[?&]page=(\d+)[^>]*>;\s*rel="last""#).unwrap();
}

/// Page number of the `rel="last"` link, which equals the item count when
/// requesting one item per page.
pub fn last_page(link_header: &str) -> Option<u64> {
    LAST_PAGE_REGEX
        .captures(link_header)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// `&since=…&until=…` for unix-second bounds.
fn timestamp_query(start_timestamp: Option<i64>, end_timestamp: Option<i64>) -> String {
    let iso = |ts: i64| {
        DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_default()
    };
    let mut query = String::new();
    if let Some(start) = start_timestamp {
        query.push_str(&format!("&since={}", iso(start)));
    }
    if let Some(end) = end_timestamp {
        query.push_str(&format!("&until={}", iso(end)));
    }
    query
}

#[derive(Clone)]
pub struct GithubService {
    http: HttpReq,
    api_url: String,
    headers: HeaderMap,
}

impl GithubService {
    pub fn new(http: HttpReq, api_key: Option<&str>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        if let Some(key) = api_key {
            match HeaderValue::from_str(&format!("Bearer {}", key)) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => tracing::warn!("GITHUB_API_KEY is not a valid header value, ignoring"),
            }
        }
        Self {
            http,
            api_url: GITHUB_API_URL.to_string(),
            headers,
        }
    }

    pub fn with_api_url(mut self, url: &str) -> Self {
        self.api_url = url.trim_end_matches('/').to_string();
        self
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> AppResult<T> {
        self.http.get_json(url, Some(self.headers.clone())).await
    }

    pub async fn get_repo(&self, owner_name: &str, repo_name: &str) -> AppResult<GithubRepo> {
        self.get(&format!("{}/repos/{}/{}", self.api_url, owner_name, repo_name))
            .await
    }

    /// One page of a user's repositories; an empty page ends pagination.
    pub async fn get_repos_from_username(&self, username: &str, page: u32) -> AppResult<Vec<GithubRepo>> {
        let url = format!(
            "{}/users/{}/repos?page={}&per_page={}",
            self.api_url, username, page, PER_PAGE
        );
        self.get(&url).await
    }

    pub async fn get_commit_details(
        &self,
        owner_name: &str,
        repo_name: &str,
        sha: &str,
    ) -> AppResult<GithubCommitDetail> {
        let url = format!(
            "{}/repos/{}/{}/commits/{}",
            self.api_url, owner_name, repo_name, sha
        );
        self.get(&url).await
    }

    pub async fn get_commits(
        &self,
        owner_name: &str,
        repo_name: &str,
        start_timestamp: Option<i64>,
        end_timestamp: Option<i64>,
        page: u32,
    ) -> AppResult<Vec<GithubCommitSummary>> {
        let url = format!(
            "{}/repos/{}/{}/commits?page={}&per_page={}{}",
            self.api_url,
            owner_name,
            repo_name,
            page,
            PER_PAGE,
            timestamp_query(start_timestamp, end_timestamp)
        );
        self.get(&url).await
    }

    /// Commit count in the window, read from the pagination links. Without a
    /// `last` link everything fits on the single page, so the page is counted.
    pub async fn get_commits_count(
        &self,
        owner_name: &str,
        repo_name: &str,
        start_timestamp: Option<i64>,
        end_timestamp: Option<i64>,
    ) -> AppResult<u64> {
        let url = format!(
            "{}/repos/{}/{}/commits?per_page=1{}",
            self.api_url,
            owner_name,
            repo_name,
            timestamp_query(start_timestamp, end_timestamp)
        );
        let response = self
            .http
            .get(&url, Some(self.headers.clone()))
            .await
            .ok_or_else(|| AppError::Unavailable(url.clone()))?;
        if !response.status().is_success() {
            return Err(AppError::Unavailable(format!("{} ({})", url, response.status())));
        }
        let last = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(last_page);
        match last {
            Some(count) => Ok(count),
            None => Ok(response.json::<Vec<GithubCommitSummary>>().await?.len() as u64),
        }
    }

    pub async fn get_org(&self, org_name: &str) -> AppResult<GithubOrg> {
        self.get(&format!("{}/orgs/{}", self.api_url, org_name)).await
    }

    /// One page of releases, newest first.
    pub async fn get_releases(&self, owner_name: &str, repo_name: &str, page: u32) -> AppResult<Vec<GithubRelease>> {
        let url = format!(
            "{}/repos/{}/{}/releases?page={}&per_page={}",
            self.api_url, owner_name, repo_name, page, PER_PAGE
        );
        self.get(&url).await
    }

    /// Newest published release tag per repo. Repos without releases, or
    /// whose lookup fails, are left out.
    pub async fn get_latest_release_tags(
        &self,
        owner_name: &str,
        repo_names: &[String],
        concurrency: usize,
    ) -> HashMap<String, String> {
        let owner_name = owner_name.to_string();
        stream::iter(repo_names.to_vec())
            .map(|repo_name| {
                let github = self.clone();
                let owner_name = owner_name.clone();
                async move {
                    match github.get_releases(&owner_name, &repo_name, 1).await {
                        Ok(releases) => releases
                            .into_iter()
                            .find(|release| !release.draft)
                            .map(|release| (repo_name, release.tag_name)),
                        Err(e) => {
                            tracing::debug!(%owner_name, %repo_name, error = %e, "Releases unavailable");
                            None
                        }
                    }
                }
            })
            .buffer_unordered(concurrency.max(1))
            .filter_map(|tag| async move { tag })
            .collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve;
    use axum::{
        Json, Router,
        extract::RawQuery,
        http::{HeaderMap as AxumHeaders, StatusCode},
        response::IntoResponse,
        routing::get,
    };
    use serde_json::json;

    #[test]
    fn test_last_page() {
        let header = r#"<https://api.github.com/repositories/1/commits?per_page=1&page=2>; rel="next", <https://api.github.com/repositories/1/commits?per_page=1&page=347>; rel="last""#;
        assert_eq!(last_page(header), Some(347));
        assert_eq!(last_page(r#"<https://x/?page=2>; rel="next""#), None);
    }

    #[test]
    fn test_timestamp_query() {
        assert_eq!(timestamp_query(None, None), "");
        assert_eq!(
            timestamp_query(Some(1_640_995_200), Some(1_641_081_600)),
            "&since=2022-01-01T00:00:00Z&until=2022-01-02T00:00:00Z"
        );
    }

    #[tokio::test]
    async fn test_commit_count_and_auth_header() {
        let app = Router::new().route(
            "/repos/{owner}/{repo}/commits",
            get(|headers: AxumHeaders, RawQuery(query): RawQuery| async move {
                assert_eq!(headers["authorization"], "Bearer secret");
                assert!(query.unwrap_or_default().contains("since=2022-01-01T00:00:00Z"));
                (
                    [(
                        "link",
                        r#"<http://x/commits?per_page=1&page=2>; rel="next", <http://x/commits?per_page=1&page=12>; rel="last""#,
                    )],
                    Json(json!([{ "sha": "a" }])),
                )
                    .into_response()
            }),
        );
        let url = serve(app).await;
        let github = GithubService::new(HttpReq::new(), Some("secret")).with_api_url(&url);
        let count = github
            .get_commits_count("rhizome", "tracker", Some(1_640_995_200), None)
            .await
            .unwrap();
        assert_eq!(count, 12);
    }

    #[tokio::test]
    async fn test_commit_count_without_pagination() {
        let app = Router::new().route(
            "/repos/{owner}/{repo}/commits",
            get(|| async { Json(json!([{ "sha": "a" }])) }),
        );
        let url = serve(app).await;
        let github = GithubService::new(HttpReq::new(), None).with_api_url(&url);
        let count = github
            .get_commits_count("rhizome", "tracker", None, None)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_unknown_repo_is_not_found() {
        let app = Router::new().route(
            "/repos/{owner}/{repo}",
            get(|| async { StatusCode::NOT_FOUND }),
        );
        let url = serve(app).await;
        let github = GithubService::new(HttpReq::new(), None).with_api_url(&url);
        let err = github.get_repo("nobody", "nothing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_org_and_latest_release_tags() {
        let app = Router::new()
            .route(
                "/orgs/{org}",
                get(|axum::extract::Path(org): axum::extract::Path<String>| async move {
                    Json(json!({ "login": org, "name": "", "public_repos": 42 }))
                }),
            )
            .route(
                "/repos/{owner}/{repo}/releases",
                get(
                    |axum::extract::Path((_, repo)): axum::extract::Path<(String, String)>| async move {
                        match repo.as_str() {
                            "goloop" => Json(json!([
                                { "id": 3, "tag_name": "v1.4.0-rc", "draft": true },
                                { "id": 2, "tag_name": "v1.3.9", "published_at": "2024-01-01T00:00:00Z" }
                            ]))
                            .into_response(),
                            "empty" => Json(json!([])).into_response(),
                            _ => StatusCode::NOT_FOUND.into_response(),
                        }
                    },
                ),
            );
        let github = GithubService::new(HttpReq::new(), None).with_api_url(&serve(app).await);

        let org = github.get_org("icon-project").await.unwrap();
        assert_eq!(org.display_name(), "icon-project");
        assert_eq!(org.public_repos, 42);

        let names = vec!["goloop".to_string(), "empty".to_string(), "gone".to_string()];
        // Spawned so the fan-out future has to be Send, as it is inside handlers.
        let tags = tokio::spawn(async move {
            github.get_latest_release_tags("icon-project", &names, 2).await
        })
        .await
        .unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags["goloop"], "v1.3.9");
    }
}
