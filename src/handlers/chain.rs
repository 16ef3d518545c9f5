//! Home page, ICX headline modules, transactions and contracts components.

use axum::{
    extract::{Path, Query, State},
    response::Html,
};
use rust_decimal::Decimal;
use sea_orm::{EntityTrait, QueryOrder, QuerySelect};
use serde::Deserialize;

use super::{PageQuery, or_empty};
use crate::AppState;
use crate::data::regex::{is_address, is_tx_hash};
use crate::entities::recent_blocks;
use crate::error::{AppError, AppResult};
use crate::models::icx::RecentBlock;
use crate::services::tracker::TransactionFilter;
use crate::utils::{calculate_average_block_time, calculate_skip, format_number, format_number_f64};
use crate::views::components;

/// Transactions sampled for the average block time.
const BLOCK_TIME_SAMPLE: u64 = 50;

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<u64>,
}

impl LimitQuery {
    fn checked(&self, default: u64, max: u64) -> AppResult<u64> {
        match self.limit.unwrap_or(default) {
            limit @ 1.. if limit <= max => Ok(limit),
            _ => Err(AppError::Unprocessable(format!(
                "limit must be between 1 and {}",
                max
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Home
// ---------------------------------------------------------------------------

pub async fn block_stream(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> AppResult<Html<String>> {
    let limit = query.checked(20, 50)?;
    let rows = or_empty(
        recent_blocks::Entity::find()
            .order_by_desc(recent_blocks::Column::Number)
            .limit(limit)
            .all(state.db.as_ref())
            .await
            .map_err(AppError::from),
        "recent blocks",
    );
    let blocks: Vec<RecentBlock> = rows
        .into_iter()
        .map(|row| RecentBlock::new(row.number, row.hash))
        .collect();
    Ok(Html(components::block_stream(&blocks)))
}

pub async fn latest_token_transfers(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> AppResult<Html<String>> {
    let limit = query.checked(20, 100)?;
    let transfers = or_empty(
        state.tracker.get_token_transfers(limit, 0, "desc").await,
        "token transfers",
    );
    Ok(Html(components::latest_token_transfers(&transfers)))
}

// ---------------------------------------------------------------------------
// ICX modules
// ---------------------------------------------------------------------------

/// `"2.00s"`, or `"-"` when fewer than two distinct timestamps came back.
pub fn format_block_time(average: Option<f64>) -> String {
    match average {
        Some(seconds) => format!("{:.2}s", seconds),
        None => "-".to_string(),
    }
}

pub async fn average_block_time(State(state): State<AppState>) -> Html<String> {
    let filter = TransactionFilter {
        limit: BLOCK_TIME_SAMPLE,
        ..TransactionFilter::default()
    };
    let transactions = or_empty(
        state.tracker.get_transactions_raw(&filter).await,
        "transactions for block time",
    );
    let timestamps: Vec<i64> = transactions.iter().map(|tx| tx.block_timestamp).collect();
    Html(components::module(
        "average-block-time",
        "Avg. Block Time",
        &format_block_time(calculate_average_block_time(&timestamps)),
    ))
}

pub async fn icx_usd_price(State(state): State<AppState>) -> Html<String> {
    let (price, market_cap) = tokio::join!(
        state.icx.get_icx_usd_price(None),
        state.tracker.get_market_cap(),
    );
    let mut body = match price {
        Ok(price) => format!("${}", format_number(price, 4, false)),
        Err(e) => {
            tracing::warn!(error = %e, "ICX price unavailable");
            "-".to_string()
        }
    };
    match market_cap {
        Ok(cap) => body.push_str(&format!(" · MC ${}", format_number_f64(cap, 0, false))),
        Err(e) => tracing::debug!(error = %e, "Market cap unavailable"),
    }
    Html(components::module("icx-usd-price", "ICX Price", &body))
}

fn format_total(total: AppResult<u64>, what: &str) -> String {
    match total {
        Ok(total) => format_number(Decimal::from(total), 0, false),
        Err(e) => {
            tracing::warn!(error = %e, "{} unavailable", what);
            "-".to_string()
        }
    }
}

pub async fn total_token_transfers(State(state): State<AppState>) -> Html<String> {
    let body = format_total(
        state.tracker.get_total_token_transfers().await,
        "token transfer total",
    );
    Html(components::module("total-token-transfers", "Token Transfers", &body))
}

pub async fn total_transactions(State(state): State<AppState>) -> Html<String> {
    let body = format_total(
        state.tracker.get_total_transactions().await,
        "transaction total",
    );
    Html(components::module("total-transactions", "Transactions", &body))
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

pub async fn transactions(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Html<String>> {
    let (page, limit) = query.validated(50, 25, Some(100))?;
    let filter = TransactionFilter {
        limit,
        skip: calculate_skip(page, limit)?,
        ..TransactionFilter::default()
    };
    let transactions = or_empty(state.tracker.get_transactions(&filter).await, "transactions");
    Ok(Html(components::transactions(
        &transactions,
        page,
        limit,
        query.refresh,
    )))
}

#[derive(Debug, Deserialize)]
pub struct ConfirmationsQuery {
    pub tx_block_height: Option<u64>,
    pub tx_hash: Option<String>,
}

/// Blocks produced since `tx_block_height`, floored at zero.
pub fn confirmation_count(latest_height: u64, tx_block_height: u64) -> u64 {
    latest_height.saturating_sub(tx_block_height)
}

/// Block height of the transaction, from the query or the node's receipt.
async fn tx_block_height(state: &AppState, query: &ConfirmationsQuery) -> AppResult<u64> {
    match (query.tx_block_height, query.tx_hash.as_deref()) {
        (Some(height), _) => Ok(height),
        (None, Some(hash)) if is_tx_hash(hash) => {
            Ok(state.icx.get_transaction_result(hash).await?.block_height)
        }
        _ => Err(AppError::Unprocessable(
            "tx_block_height or a valid tx_hash is required".to_string(),
        )),
    }
}

pub async fn confirmations(
    State(state): State<AppState>,
    Query(query): Query<ConfirmationsQuery>,
) -> AppResult<Html<String>> {
    let height = match tx_block_height(&state, &query).await {
        Err(e @ AppError::Unprocessable(_)) => return Err(e),
        other => other,
    };
    let formatted = match (state.icx.get_latest_height().await, height) {
        (Ok(latest), Ok(height)) => format_number(
            Decimal::from(confirmation_count(latest, height)),
            0,
            false,
        ),
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "Confirmations unavailable");
            "-".to_string()
        }
    };
    Ok(Html(components::confirmations(&formatted)))
}

pub async fn transaction_logs(
    State(state): State<AppState>,
    Path(tx_hash): Path<String>,
) -> AppResult<Html<String>> {
    if !is_tx_hash(&tx_hash) {
        return Err(AppError::Unprocessable(format!("invalid transaction hash: {}", tx_hash)));
    }
    let logs = or_empty(
        state.tracker.get_transaction_logs(&tx_hash).await,
        "transaction logs",
    );
    Ok(Html(components::transaction_logs(&logs)))
}

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ContractsQuery {
    #[serde(default = "first_page")]
    pub page: u64,
    pub limit: Option<u64>,
    pub token_standard: Option<String>,
}

fn first_page() -> u64 {
    1
}

pub async fn contracts(
    State(state): State<AppState>,
    Query(query): Query<ContractsQuery>,
) -> AppResult<Html<String>> {
    let (page, limit) = PageQuery {
        page: query.page,
        limit: query.limit,
        refresh: false,
    }
    .validated(100, 25, None)?;
    let token_standard = query.token_standard.as_deref().filter(|s| !s.is_empty());
    let contracts = or_empty(
        state
            .tracker
            .get_contracts(limit, calculate_skip(page, limit)?, token_standard)
            .await,
        "contracts",
    );
    Ok(Html(components::contracts(&contracts, page, limit, token_standard)))
}

// ---------------------------------------------------------------------------
// Tools
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct StakingClaimsQuery {
    pub address: String,
}

pub async fn historical_staking_claims(
    State(state): State<AppState>,
    Query(query): Query<StakingClaimsQuery>,
) -> AppResult<Html<String>> {
    let address = query.address.trim();
    if !is_address(address) {
        return Err(AppError::Unprocessable(format!("invalid address: {}", address)));
    }
    let filter = TransactionFilter {
        from_address: Some(address.to_string()),
        method: Some("claimIScore".to_string()),
        limit: 100,
        ..TransactionFilter::default()
    };
    let claims = or_empty(state.tracker.get_transactions(&filter).await, "staking claims");
    Ok(Html(components::staking_claims(address, &claims)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_block_time() {
        assert_eq!(format_block_time(Some(2.0)), "2.00s");
        assert_eq!(format_block_time(Some(1.987)), "1.99s");
        assert_eq!(format_block_time(None), "-");
    }

    #[test]
    fn test_confirmation_count() {
        assert_eq!(confirmation_count(1_000, 990), 10);
        assert_eq!(confirmation_count(1_000, 1_000), 0);
        assert_eq!(confirmation_count(990, 1_000), 0);
    }

    #[test]
    fn test_limit_query_bounds() {
        assert_eq!(LimitQuery { limit: None }.checked(20, 50).unwrap(), 20);
        assert_eq!(LimitQuery { limit: Some(50) }.checked(20, 50).unwrap(), 50);
        assert!(LimitQuery { limit: Some(51) }.checked(20, 50).is_err());
        assert!(LimitQuery { limit: Some(0) }.checked(20, 50).is_err());
    }
}
