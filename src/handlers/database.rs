//! Manual sync triggers under `/api/v1/database`.
//!
//! Each trigger runs one snapshot and reports the outcome to Discord as
//! `SUCCESS: {path}` or `FAIL: {path}`. The GitHub syncs are slow and run
//! in the background; their responses return before the sync finishes.

use axum::{
    Json,
    extract::{OriginalUri, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::AppResult;
use crate::services::snapshot::validate_snapshot_timestamp;

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub path: String,
    /// Rows written, absent for background syncs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

type SyncResult = AppResult<(StatusCode, Json<SyncResponse>)>;

pub fn notification(path: &str, ok: bool) -> String {
    if ok {
        format!("SUCCESS: {}", path)
    } else {
        format!("FAIL: {}", path)
    }
}

/// Reports `result` to Discord and turns it into a `201 Created`.
async fn finish(state: &AppState, path: String, result: AppResult<usize>) -> SyncResult {
    match result {
        Ok(count) => {
            tracing::info!(%path, count, "Sync finished");
            state.discord.send(&notification(&path, true)).await;
            Ok((
                StatusCode::CREATED,
                Json(SyncResponse {
                    path,
                    count: Some(count),
                }),
            ))
        }
        Err(e) => {
            tracing::error!(%path, error = %e, "Sync failed");
            state.discord.send(&notification(&path, false)).await;
            Err(e)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SyncLimitQuery {
    #[serde(default = "default_sync_limit")]
    pub limit: u64,
}

fn default_sync_limit() -> u64 {
    50
}

pub async fn balanced_loans(State(state): State<AppState>, OriginalUri(uri): OriginalUri) -> SyncResult {
    let result = state.snapshot.sync_balanced_loans().await;
    finish(&state, uri.path().to_string(), result).await
}

pub async fn recent_blocks(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<SyncLimitQuery>,
) -> SyncResult {
    let result = state.snapshot.sync_recent_blocks(query.limit).await;
    finish(&state, uri.path().to_string(), result).await
}

pub async fn recent_transactions(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<SyncLimitQuery>,
) -> SyncResult {
    let result = state.snapshot.sync_recent_transactions(query.limit).await;
    finish(&state, uri.path().to_string(), result).await
}

pub async fn pool_static_data(State(state): State<AppState>, OriginalUri(uri): OriginalUri) -> SyncResult {
    let result = state.snapshot.sync_pool_static_data().await;
    finish(&state, uri.path().to_string(), result).await
}

#[derive(Debug, Deserialize)]
pub struct SnapshotTimestampQuery {
    pub timestamp: Option<i64>,
}

pub async fn pool_dynamic_data(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<SnapshotTimestampQuery>,
) -> SyncResult {
    validate_snapshot_timestamp(query.timestamp)?;
    let result = state.snapshot.sync_pool_dynamic_data(query.timestamp).await;
    finish(&state, uri.path().to_string(), result).await
}

pub async fn quotes(State(state): State<AppState>, OriginalUri(uri): OriginalUri) -> SyncResult {
    let result = state.snapshot.sync_quotes().await;
    finish(&state, uri.path().to_string(), result).await
}

pub async fn validator_node_statuses(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> SyncResult {
    let result = state.snapshot.sync_validator_node_statuses().await;
    finish(&state, uri.path().to_string(), result).await
}

#[derive(Debug, Deserialize)]
pub struct GithubReposQuery {
    pub owner_name: Option<String>,
}

fn accepted(path: String) -> (StatusCode, Json<SyncResponse>) {
    (StatusCode::CREATED, Json(SyncResponse { path, count: None }))
}

pub async fn github_repos(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<GithubReposQuery>,
) -> (StatusCode, Json<SyncResponse>) {
    let path = uri.path().to_string();
    let task_path = path.clone();
    tokio::spawn(async move {
        let result = state.github_sync.sync_repos(query.owner_name.as_deref()).await;
        // Errors are reported through Discord and the log only.
        let _ = finish(&state, task_path, result).await;
    });
    accepted(path)
}

#[derive(Debug, Deserialize)]
pub struct GithubCommitsQuery {
    pub start_timestamp: Option<i64>,
    pub end_timestamp: Option<i64>,
    pub owner_name: Option<String>,
}

pub async fn github_commits(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<GithubCommitsQuery>,
) -> (StatusCode, Json<SyncResponse>) {
    let path = uri.path().to_string();
    let task_path = path.clone();
    tokio::spawn(async move {
        let result = state
            .github_sync
            .sync_commits(
                query.owner_name.as_deref(),
                query.start_timestamp,
                query.end_timestamp,
            )
            .await;
        let _ = finish(&state, task_path, result).await;
    });
    accepted(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification() {
        assert_eq!(
            notification("/api/v1/database/recent-blocks/", true),
            "SUCCESS: /api/v1/database/recent-blocks/"
        );
        assert_eq!(
            notification("/api/v1/database/balanced/loans/", false),
            "FAIL: /api/v1/database/balanced/loans/"
        );
    }

    #[test]
    fn test_background_response_omits_count() {
        let body = serde_json::to_value(SyncResponse {
            path: "/x/".to_string(),
            count: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "path": "/x/" }));
    }
}
