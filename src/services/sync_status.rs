//! Last-run bookkeeping for the snapshot jobs.
//!
//! A job that succeeded less than its minimum interval ago is skipped, so a
//! restart does not hammer the upstream APIs.

use chrono::{Duration, NaiveDateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::entities::sync_status::{self, Entity as SyncStatus};

/// Job names for tracking sync status
pub mod jobs {
    pub const RECENT_BLOCKS: &str = "recent_blocks_sync";
    pub const RECENT_TRANSACTIONS: &str = "recent_transactions_sync";
    pub const ICX_SICX_BNUSD_QUOTES: &str = "icx_sicx_bnusd_quotes_sync";
    pub const BALANCED_POOLS: &str = "balanced_pools_sync";
    pub const BALANCED_LOANS: &str = "balanced_loans_sync";
    pub const VALIDATOR_NODE_STATUS: &str = "validator_node_status_sync";
    pub const GITHUB_REPOS: &str = "github_repos_sync";
    pub const GITHUB_COMMITS: &str = "github_commits_sync";
    pub const PRUNE_RECENT: &str = "prune_recent_sync";
}

/// Minimum seconds between successful runs
pub mod intervals {
    pub const RECENT_BLOCKS: i32 = 10;
    pub const RECENT_TRANSACTIONS: i32 = 10;
    pub const ICX_SICX_BNUSD_QUOTES: i32 = 60;
    pub const BALANCED_POOLS: i32 = 300;          // 5 minutes
    pub const BALANCED_LOANS: i32 = 3600;         // 1 hour
    pub const VALIDATOR_NODE_STATUS: i32 = 300;   // 5 minutes
    pub const GITHUB_REPOS: i32 = 21600;          // 6 hours
    pub const GITHUB_COMMITS: i32 = 3600;         // 1 hour
    pub const PRUNE_RECENT: i32 = 3600;
}

/// Whether a job whose last success was at `last_success` may run at `now`.
pub fn is_due(last_success: Option<NaiveDateTime>, min_interval_secs: i32, now: NaiveDateTime) -> bool {
    match last_success {
        None => true,
        Some(last) => now.signed_duration_since(last) >= Duration::seconds(min_interval_secs as i64),
    }
}

/// Check if a sync job should run based on last successful sync time
pub async fn should_sync(
    db: &DatabaseConnection,
    job_name: &str,
) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
    let Some(record) = SyncStatus::find_by_id(job_name.to_string()).one(db).await? else {
        tracing::info!("[{}] First run detected, will sync", job_name);
        return Ok(true);
    };

    let now = Utc::now().naive_utc();
    let due = is_due(record.last_success_at, record.min_interval_secs, now);
    if !due {
        tracing::debug!(
            "[{}] Skipping sync - last success at {:?}, min interval {}s",
            job_name,
            record.last_success_at,
            record.min_interval_secs
        );
    }
    Ok(due)
}

/// Record a successful sync
pub async fn record_success(
    db: &DatabaseConnection,
    job_name: &str,
    default_interval_secs: i32,
    row_count: usize,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let now = Utc::now().naive_utc();

    match SyncStatus::find_by_id(job_name.to_string()).one(db).await? {
        Some(record) => {
            let success_count = record.success_count;
            let mut active_model: sync_status::ActiveModel = record.into();
            active_model.last_success_at = Set(Some(now));
            active_model.last_attempt_at = Set(Some(now));
            active_model.last_error = Set(None);
            active_model.last_row_count = Set(row_count as i64);
            active_model.success_count = Set(success_count + 1);
            active_model.update(db).await?;
        }
        None => {
            sync_status::ActiveModel {
                job_name: Set(job_name.to_string()),
                last_success_at: Set(Some(now)),
                last_attempt_at: Set(Some(now)),
                last_error: Set(None),
                last_row_count: Set(row_count as i64),
                success_count: Set(1),
                error_count: Set(0),
                min_interval_secs: Set(default_interval_secs),
            }
            .insert(db)
            .await?;
        }
    }

    tracing::debug!("[{}] Recorded successful sync ({} rows)", job_name, row_count);
    Ok(())
}

/// Record a failed sync attempt
pub async fn record_failure(
    db: &DatabaseConnection,
    job_name: &str,
    error: &str,
    default_interval_secs: i32,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let now = Utc::now().naive_utc();

    match SyncStatus::find_by_id(job_name.to_string()).one(db).await? {
        Some(record) => {
            let error_count = record.error_count;
            let mut active_model: sync_status::ActiveModel = record.into();
            active_model.last_attempt_at = Set(Some(now));
            active_model.last_error = Set(Some(error.to_string()));
            active_model.error_count = Set(error_count + 1);
            active_model.update(db).await?;
        }
        None => {
            sync_status::ActiveModel {
                job_name: Set(job_name.to_string()),
                last_success_at: Set(None),
                last_attempt_at: Set(Some(now)),
                last_error: Set(Some(error.to_string())),
                last_row_count: Set(0),
                success_count: Set(0),
                error_count: Set(1),
                min_interval_secs: Set(default_interval_secs),
            }
            .insert(db)
            .await?;
        }
    }

    tracing::debug!("[{}] Recorded failed sync: {}", job_name, error);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_is_due() {
        let now = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert!(is_due(None, 60, now));
        assert!(!is_due(Some(now - Duration::seconds(30)), 60, now));
        assert!(is_due(Some(now - Duration::seconds(60)), 60, now));
    }
}
