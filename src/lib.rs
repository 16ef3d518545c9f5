// src/lib.rs

use std::sync::Arc;

use axum::{
    Router, handler::HandlerWithoutStateExt, middleware,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use config::Config;
use handlers::{address, api, balanced, build, chain, database, governance, guards, pages};
use services::{
    balanced::BalancedService, balanced_api::BalancedApiService, cps::CpsService,
    discord::DiscordNotifier, github::GithubService, github_sync::GithubSyncService,
    gov::GovService, http_request::HttpReq, icx::IcxService, snapshot::SnapshotService,
    tokens::TokensService, tracker::TrackerService,
};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<Config>,
    pub icx: IcxService,
    pub tracker: TrackerService,
    pub tokens: TokensService,
    pub balanced: BalancedService,
    pub balanced_api: BalancedApiService,
    pub gov: GovService,
    pub cps: CpsService,
    pub github: GithubService,
    pub github_sync: GithubSyncService,
    pub snapshot: SnapshotService,
    pub discord: DiscordNotifier,
}

impl AppState {
    /// Wires every upstream client from `config`. Nothing is fetched yet.
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        let db = Arc::new(db);
        let http = HttpReq::new();
        let icx = IcxService::new(http.clone(), &config.icon_api_endpoint);
        let tracker = TrackerService::new(http.clone(), &config.icon_tracker_endpoint);
        let tokens = TokensService::new(icx.clone());
        let balanced = BalancedService::new(
            icx.clone(),
            tokens.clone(),
            tracker.clone(),
            config.max_workers,
        );
        let balanced_api =
            BalancedApiService::new(http.clone(), &config.balanced_api_url, tokens.clone());
        let gov = GovService::new(icx.clone(), http.clone(), config.max_workers);
        let cps = CpsService::new(icx.clone());
        let github = GithubService::new(http.clone(), config.github_api_key.as_deref());
        let github_sync = GithubSyncService::new(db.clone(), github.clone());
        let snapshot = SnapshotService::new(
            db.clone(),
            icx.clone(),
            tracker.clone(),
            balanced.clone(),
            gov.clone(),
        );
        let discord = DiscordNotifier::new(http, config.discord_webhook_url.clone());

        Self {
            db,
            config: Arc::new(config),
            icx,
            tracker,
            tokens,
            balanced,
            balanced_api,
            gov,
            cps,
            github,
            github_sync,
            snapshot,
            discord,
        }
    }
}

fn component_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        // Address
        .route("/address/overview/{address}/", get(address::overview))
        .route("/address/transactions/{address}/", get(address::transactions))
        .route(
            "/address-book/",
            get(address::address_book).post(address::register_address),
        )
        // Balanced
        .route("/balanced/dao-fund-balance-sheet/", get(balanced::dao_fund_balance_sheet))
        .route("/balanced/liquidations/", get(balanced::liquidations))
        .route("/balanced/loans/", get(balanced::loans))
        .route("/balanced/loans/overview/", get(balanced::loans_overview))
        .route("/balanced/stability-fund/", get(balanced::stability_fund))
        .route("/balanced/pools/", get(balanced::pools))
        .route("/balanced/bnusd-usd-price-chart/", get(balanced::bnusd_price_chart))
        // Build
        .route("/build/commits/", get(build::commits))
        .route("/build/commits/leaderboard/", get(build::leaderboard))
        .route("/build/commits-7d-chart/", get(build::commits_7d_chart))
        .route("/build/commits-ytd-chart/", get(build::commits_ytd_chart))
        .route("/build/owners/", get(build::owners))
        .route("/build/repos/", get(build::repos))
        // Contracts
        .route("/contracts/", get(chain::contracts))
        // Governance
        .route("/governance/iiss-overview/", get(governance::iiss_overview))
        .route("/governance/validators/", get(governance::validators))
        // Home
        .route("/home/block-stream/", get(chain::block_stream))
        .route("/home/latest-token-transfers/", get(chain::latest_token_transfers))
        // ICX
        .route("/icx/average-block-time/", get(chain::average_block_time))
        .route("/icx/icx-usd-price/", get(chain::icx_usd_price))
        .route("/icx/total-token-transfers/", get(chain::total_token_transfers))
        .route("/icx/total-transactions/", get(chain::total_transactions))
        // Transaction
        .route("/transaction/confirmations/", get(chain::confirmations))
        .route("/transaction/logs/{tx_hash}/", get(chain::transaction_logs))
        // Transactions
        .route("/transactions/", get(chain::transactions))
        .route("/transactions/total-transactions/", get(chain::total_transactions))
        .route("/transactions/total-token-transfers/", get(chain::total_token_transfers))
        // Tools
        .route(
            "/tools/historical-staking-claims/",
            get(chain::historical_staking_claims),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), guards::require_htmx))
}

fn database_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/balanced/loans/", post(database::balanced_loans))
        .route("/recent-blocks/", post(database::recent_blocks))
        .route("/recent-transactions/", post(database::recent_transactions))
        .route(
            "/balanced/pool-static-data-snapshot/",
            post(database::pool_static_data),
        )
        .route(
            "/balanced/pool-dynamic-data-snapshot/",
            post(database::pool_dynamic_data),
        )
        .route("/insert/icx-sicx-bnusd-quotes/", post(database::quotes))
        .route(
            "/insert/validators-node-status/",
            post(database::validator_node_statuses),
        )
        .route("/github/repos/", post(database::github_repos))
        .route("/github/commits/", post(database::github_commits))
        .route_layer(middleware::from_fn_with_state(state.clone(), guards::require_localhost))
}

/// Full application router: pages, htmx components, JSON API and assets.
pub fn build_router(state: AppState) -> Router {
    let assets = ServeDir::new(&state.config.static_dir)
        .fallback(pages::asset_not_found.into_service());

    let api = Router::new()
        .route("/icx/icx-sicx-bnusd-quotes/", get(api::icx_sicx_bnusd_quotes))
        .route("/icx/latest-block/", get(api::latest_block))
        .nest("/database", database_routes(&state));

    Router::new()
        .route("/", get(pages::home))
        .route("/address/{address}/", get(pages::address))
        .route("/addresses/", get(pages::addresses))
        .route("/block/{height}/", get(pages::block))
        .route("/btp/", get(pages::btp))
        .route("/build/", get(pages::build))
        .route("/contract/{address}/", get(pages::contract))
        .route("/contracts/", get(pages::contracts))
        .route("/dapps/", get(pages::dapps))
        .route("/dapps/balanced/", get(pages::balanced))
        .route("/dapps/balanced/liquidations/", get(pages::balanced_liquidations))
        .route("/dapps/balanced/loans/", get(pages::balanced_loans))
        .route("/governance/", get(pages::governance))
        .route("/tokens/", get(pages::tokens))
        .route("/transaction/{tx_hash}/", get(pages::transaction))
        .route("/transactions/", get(pages::transactions))
        .route("/validator/{address}/", get(pages::validator))
        .route("/status/", get(pages::status))
        .route("/health-check/", get(pages::health_check))
        .route("/404/", get(pages::not_found))
        .route("/search/", post(pages::search))
        .nest("/components", component_routes(&state))
        .nest("/api/v1", api)
        .nest_service("/assets", assets)
        .fallback(pages::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub mod entities {
    pub mod prelude;
    pub mod balanced_loans;
    pub mod balanced_pool_dynamic_snapshots;
    pub mod balanced_pool_static_data;
    pub mod github_commits;
    pub mod github_repos;
    pub mod icx_sicx_bnusd_quotes;
    pub mod recent_blocks;
    pub mod recent_transactions;
    pub mod sync_status;
    pub mod validator_node_statuses;
}

pub mod services {
    pub mod balanced;
    pub mod balanced_api;
    pub mod cps;
    pub mod discord;
    pub mod github;
    pub mod github_sync;
    pub mod gov;
    pub mod http_request;
    pub mod icx;
    pub mod snapshot;
    pub mod sync_status;
    pub mod tokens;
    pub mod tracker;
}

pub mod config;
pub mod data;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod models;
pub mod utils;
pub mod views;

#[cfg(test)]
pub(crate) mod test_support;
