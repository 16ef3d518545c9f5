//! Runtime configuration and process-wide constants.

use std::env;

use crate::error::AppError;

/// Loop (10^18) fixed-point scale used by ICX and most IRC-2 tokens.
pub const EXA: u32 = 18;

/// ICON mainnet genesis timestamp in seconds.
pub const GENESIS_TIMESTAMP_S: i64 = 1516819217;

/// Roughly one day of 2-second blocks.
pub const BLOCKS_PER_DAY: u64 = 43200;

pub const CHAIN_CONTRACT: &str = "cx0000000000000000000000000000000000000000";
pub const GOVERNANCE_CONTRACT: &str = "cx0000000000000000000000000000000000000001";
pub const PRICE_ORACLE_CONTRACT: &str = "cx087b4164a87fdfb7b714f3bafe9dfb050fd6b132";
pub const CPS_CONTRACT: &str = "cx9f4ab72f854d3ccdc59aa6f2c3e2215dd62e879f";

pub mod balanced {
    pub const DEX_CONTRACT: &str = "cxa0af3165c08318e988cb30993b3048335b94af6c";
    pub const LOANS_CONTRACT: &str = "cx66d4d90f5f113eba575bf793570135f9b10cece1";
    pub const BNUSD_CONTRACT: &str = "cx88fd7df7ddff82f7cc735c871dc519838cb235bb";
    pub const SICX_CONTRACT: &str = "cx2609b924e33ef00b648a409245c7ea394c467824";
    pub const STABILITY_FUND_CONTRACT: &str = "cxa09dbb60dcb62fffbd232b6eae132d730a2aafa6";
    pub const USDS_CONTRACT: &str = "cxbb2871f468a3008f80b08fdde5b8b951583acf06";
    pub const IUSDC_CONTRACT: &str = "cxae3034235540b924dfcc1b45836c293dcc82bfb7";
    pub const FEATURED_POOL_IDS: [u32; 12] = [2, 3, 4, 5, 6, 7, 8, 9, 10, 15, 17, 31];
}

pub mod github {
    /// Tracked GitHub owners, sorted case-insensitively.
    pub const USERNAMES: [&str; 8] = [
        "balancednetwork",
        "espanicon",
        "icon-community",
        "icon-project",
        "openmoneymarket",
        "rhizome-labs",
        "staky-io",
        "sudoblockio",
    ];

    /// Repositories tracked outside of the owners above.
    pub const ADDITIONAL_REPOS: [(&str, &str); 1] = [("web3labs", "ice-substrate")];

    pub const IGNORED_REPO_IDS: [i64; 22] = [
        419481604, 131121676, 125140421, 356387774, 422671636, 358748490, 419252594, 346519273,
        347179227, 462903782, 326794018, 346642799, 434479312, 347181119, 347181250, 347176745,
        347177139, 368600737, 347176870, 347175004, 347176204, 347176432,
    ];

    pub fn is_ignored(repo_id: i64) -> bool {
        IGNORED_REPO_IDS.contains(&repo_id)
    }

    pub fn is_tracked_owner(owner_name: &str) -> bool {
        USERNAMES.iter().any(|u| u.eq_ignore_ascii_case(owner_name))
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub discord_webhook_url: Option<String>,
    pub env: String,
    pub github_api_key: Option<String>,
    pub icon_api_endpoint: String,
    pub icon_tracker_endpoint: String,
    pub balanced_api_url: String,
    pub bind_addr: String,
    pub static_dir: String,
    pub max_workers: usize,
    pub enable_sync_jobs: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::Config("DATABASE_URL must be set".to_string()))?;

        let max_workers = env::var("MAX_WORKERS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_max_workers);

        Ok(Self {
            database_url,
            discord_webhook_url: env::var("DISCORD_WEBHOOK_URL").ok(),
            env: env::var("ENV").unwrap_or_else(|_| "DEVELOPMENT".to_string()),
            github_api_key: env::var("GITHUB_API_KEY").ok(),
            icon_api_endpoint: env::var("ICON_API_ENDPOINT")
                .unwrap_or_else(|_| "https://api.icon.community".to_string()),
            icon_tracker_endpoint: env::var("ICON_TRACKER_ENDPOINT")
                .unwrap_or_else(|_| "https://tracker.icon.community/api/v1".to_string()),
            balanced_api_url: env::var("BALANCED_API_URL")
                .unwrap_or_else(|_| "https://balanced.sudoblock.io/api/v1".to_string()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string()),
            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string()),
            max_workers,
            enable_sync_jobs: env::var("ENABLE_SYNC_JOBS")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        })
    }

    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

fn default_max_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get() * 4)
        .unwrap_or(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usernames_are_sorted() {
        let mut sorted = github::USERNAMES.to_vec();
        sorted.sort_by_key(|u| u.to_lowercase());
        assert_eq!(sorted, github::USERNAMES.to_vec());
    }

    #[test]
    fn test_tracked_owner_is_case_insensitive() {
        assert!(github::is_tracked_owner("Balancednetwork"));
        assert!(!github::is_tracked_owner("octocat"));
    }

    #[test]
    fn test_ignored_repo() {
        assert!(github::is_ignored(419481604));
        assert!(!github::is_ignored(1));
    }
}
