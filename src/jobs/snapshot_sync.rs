use std::future::Future;
use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tokio::time::{Duration, interval};

use crate::error::{AppError, AppResult};
use crate::services::github_sync::GithubSyncService;
use crate::services::snapshot::SnapshotService;
use crate::services::sync_status::{self, intervals, jobs};

/// Rows kept in the recent block and transaction caches.
pub const RECENT_RETENTION: u64 = 1_000;

/// Blocks and transactions pulled per sync.
pub const RECENT_SYNC_LIMIT: u64 = 50;

/// Runs `work` every `min_interval_secs`, skipping runs that `sync_status`
/// says happened too recently. Stops on Ctrl-C.
fn spawn_job<F, Fut>(
    db: Arc<DatabaseConnection>,
    job_name: &'static str,
    min_interval_secs: i32,
    startup_delay: Duration,
    work: F,
) where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = AppResult<usize>> + Send,
{
    tokio::spawn(async move {
        tokio::time::sleep(startup_delay).await;
        let mut interval = interval(Duration::from_secs(min_interval_secs.max(1) as u64));

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("[{}] Shutdown signal received, stopping job", job_name);
                    break;
                }
                _ = interval.tick() => {
                    run_once(&db, job_name, min_interval_secs, &work).await;
                }
            }
        }
    });
}

async fn run_once<F, Fut>(db: &DatabaseConnection, job_name: &str, min_interval_secs: i32, work: &F)
where
    F: Fn() -> Fut,
    Fut: Future<Output = AppResult<usize>>,
{
    match sync_status::should_sync(db, job_name).await {
        Ok(true) => {
            tracing::info!("[{}] Starting sync", job_name);
            match work().await {
                Ok(row_count) => {
                    tracing::info!("[{}] Synced {} rows", job_name, row_count);
                    if let Err(e) =
                        sync_status::record_success(db, job_name, min_interval_secs, row_count).await
                    {
                        tracing::warn!("[{}] Failed to record sync success: {}", job_name, e);
                    }
                }
                Err(e) => {
                    tracing::error!("[{}] Sync failed: {}", job_name, e);
                    if let Err(e2) =
                        sync_status::record_failure(db, job_name, &e.to_string(), min_interval_secs)
                            .await
                    {
                        tracing::warn!("[{}] Failed to record sync failure: {}", job_name, e2);
                    }
                }
            }
        }
        Ok(false) => {
            tracing::debug!("[{}] Skipping sync (recently synced)", job_name);
        }
        Err(e) => {
            tracing::warn!("[{}] Failed to check sync status: {}", job_name, e);
        }
    }
}

/// Starts the chain and Balanced snapshot loops.
pub async fn start_snapshot_jobs(db: Arc<DatabaseConnection>, snapshot: SnapshotService) {
    let s = snapshot.clone();
    spawn_job(db.clone(), jobs::RECENT_BLOCKS, intervals::RECENT_BLOCKS, Duration::from_secs(5), move || {
        let s = s.clone();
        async move { s.sync_recent_blocks(RECENT_SYNC_LIMIT).await }
    });

    let s = snapshot.clone();
    spawn_job(
        db.clone(),
        jobs::RECENT_TRANSACTIONS,
        intervals::RECENT_TRANSACTIONS,
        Duration::from_secs(5),
        move || {
            let s = s.clone();
            async move { s.sync_recent_transactions(RECENT_SYNC_LIMIT).await }
        },
    );

    let s = snapshot.clone();
    spawn_job(
        db.clone(),
        jobs::ICX_SICX_BNUSD_QUOTES,
        intervals::ICX_SICX_BNUSD_QUOTES,
        Duration::from_secs(10),
        move || {
            let s = s.clone();
            async move { s.sync_quotes().await }
        },
    );

    let s = snapshot.clone();
    spawn_job(db.clone(), jobs::BALANCED_POOLS, intervals::BALANCED_POOLS, Duration::from_secs(20), move || {
        let s = s.clone();
        async move {
            let static_rows = s.sync_pool_static_data().await?;
            let dynamic_rows = s.sync_pool_dynamic_data(None).await?;
            Ok::<_, AppError>(static_rows + dynamic_rows)
        }
    });

    let s = snapshot.clone();
    spawn_job(db.clone(), jobs::BALANCED_LOANS, intervals::BALANCED_LOANS, Duration::from_secs(30), move || {
        let s = s.clone();
        async move { s.sync_balanced_loans().await }
    });

    let s = snapshot.clone();
    spawn_job(
        db.clone(),
        jobs::VALIDATOR_NODE_STATUS,
        intervals::VALIDATOR_NODE_STATUS,
        Duration::from_secs(30),
        move || {
            let s = s.clone();
            async move { s.sync_validator_node_statuses().await }
        },
    );

    let s = snapshot;
    spawn_job(db, jobs::PRUNE_RECENT, intervals::PRUNE_RECENT, Duration::from_secs(60), move || {
        let s = s.clone();
        async move { Ok::<_, AppError>(s.prune_recent(RECENT_RETENTION).await? as usize) }
    });

    tracing::info!("Snapshot jobs started");
}

/// Starts the GitHub repo and commit loops.
pub async fn start_github_jobs(db: Arc<DatabaseConnection>, github_sync: GithubSyncService) {
    let g = github_sync.clone();
    spawn_job(db.clone(), jobs::GITHUB_REPOS, intervals::GITHUB_REPOS, Duration::from_secs(60), move || {
        let g = g.clone();
        async move { g.sync_repos(None).await }
    });

    let g = github_sync;
    spawn_job(db, jobs::GITHUB_COMMITS, intervals::GITHUB_COMMITS, Duration::from_secs(120), move || {
        let g = g.clone();
        async move { g.sync_commits(None, None, None).await }
    });

    tracing::info!("GitHub jobs started");
}
