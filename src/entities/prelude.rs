pub use super::balanced_loans::Entity as BalancedLoans;
pub use super::balanced_pool_dynamic_snapshots::Entity as BalancedPoolDynamicSnapshots;
pub use super::balanced_pool_static_data::Entity as BalancedPoolStaticData;
pub use super::github_commits::Entity as GithubCommits;
pub use super::github_repos::Entity as GithubRepos;
pub use super::icx_sicx_bnusd_quotes::Entity as IcxSicxBnusdQuotes;
pub use super::recent_blocks::Entity as RecentBlocks;
pub use super::recent_transactions::Entity as RecentTransactions;
pub use super::sync_status::Entity as SyncStatus;
pub use super::validator_node_statuses::Entity as ValidatorNodeStatuses;
