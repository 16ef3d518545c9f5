//! Balanced DEX and loans contract reads.

use futures_util::stream::{self, StreamExt};
use moka::future::Cache;
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{BLOCKS_PER_DAY, EXA, balanced};
use crate::error::{AppError, AppResult};
use crate::models::balanced::{BalancedLoan, Liquidation, Pool, RawPoolStats};
use crate::services::icx::IcxService;
use crate::services::tokens::TokensService;
use crate::services::tracker::TrackerService;
use crate::utils::{calculate_skip, scale};

pub const LIQUIDATIONS_PAGE_SIZE: u64 = 100;

#[derive(Clone)]
pub struct BalancedService {
    icx: IcxService,
    tokens: TokensService,
    tracker: TrackerService,
    max_workers: usize,
    // Position index -> owner address; positions never change owner.
    loan_addresses: Arc<Cache<u64, String>>,
}

impl BalancedService {
    pub fn new(
        icx: IcxService,
        tokens: TokensService,
        tracker: TrackerService,
        max_workers: usize,
    ) -> Self {
        Self {
            icx,
            tokens,
            tracker,
            max_workers: max_workers.max(1),
            loan_addresses: Arc::new(
                Cache::builder()
                    .max_capacity(10_000)
                    .time_to_live(Duration::from_secs(86_400))
                    .build(),
            ),
        }
    }

    pub async fn get_borrower_count(&self) -> AppResult<u64> {
        let count = self
            .icx
            .call_int(balanced::LOANS_CONTRACT, "borrowerCount", json!({}), None)
            .await?;
        Ok(count.max(0) as u64)
    }

    pub async fn get_loan_address(&self, index: u64) -> AppResult<String> {
        if let Some(address) = self.loan_addresses.get(&index).await {
            return Ok(address);
        }
        let result = self
            .icx
            .call(
                balanced::LOANS_CONTRACT,
                "getPositionAddress",
                json!({ "_index": format!("0x{:x}", index) }),
                None,
            )
            .await?;
        let address = result
            .as_str()
            .ok_or_else(|| AppError::Decode(format!("getPositionAddress({}): {}", index, result)))?
            .to_string();
        self.loan_addresses.insert(index, address.clone()).await;
        Ok(address)
    }

    /// Loan position `index`. Positions the contract rejects come back as `None`.
    pub async fn get_loan(&self, index: u64) -> AppResult<Option<BalancedLoan>> {
        let address = self.get_loan_address(index).await?;
        let position = match self
            .icx
            .call(
                balanced::LOANS_CONTRACT,
                "getAccountPositions",
                json!({ "_owner": address }),
                None,
            )
            .await
        {
            Ok(position) => position,
            Err(AppError::Rpc { code, message }) => {
                tracing::debug!(index, code, %message, "Skipping loan position");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        tracing::debug!(index, "Processing Balanced loan");
        BalancedLoan::from_position(&position).map(Some)
    }

    /// Every position from 1 through the borrower count, ordered by id.
    pub async fn get_loans(&self) -> AppResult<Vec<BalancedLoan>> {
        let count = self.get_borrower_count().await?;
        let mut loans: Vec<BalancedLoan> = stream::iter(1..=count)
            .map(|index| async move {
                match self.get_loan(index).await {
                    Ok(loan) => loan,
                    Err(e) => {
                        tracing::warn!(index, error = %e, "Failed to fetch loan position");
                        None
                    }
                }
            })
            .buffer_unordered(self.max_workers)
            .filter_map(|loan| async move { loan })
            .collect()
            .await;
        loans.sort_by_key(|loan| loan.pos_id);
        Ok(loans)
    }

    pub async fn get_pool_count(&self, height: Option<u64>) -> AppResult<u32> {
        let nonce = self
            .icx
            .call_int(balanced::DEX_CONTRACT, "getNonce", json!({}), height)
            .await?;
        Ok(nonce.max(0) as u32)
    }

    /// Pool stats at `height`, without the 24h change. `None` when the pool
    /// did not exist yet.
    pub async fn get_pool_stats(&self, pool_id: u32, height: Option<u64>) -> AppResult<Option<Pool>> {
        let raw: RawPoolStats = match self
            .icx
            .call_as(
                balanced::DEX_CONTRACT,
                "getPoolStats",
                json!({ "_id": format!("0x{:x}", pool_id) }),
                height,
            )
            .await
        {
            Ok(raw) => raw,
            Err(e) if e.rpc_code() == Some(AppError::SCORE_NOT_FOUND) => return Ok(None),
            Err(e) => return Err(e),
        };

        let (base, quote) = tokio::join!(
            self.tokens.get_token_info(raw.base_token.as_deref()),
            self.tokens.get_token_info(raw.quote_token.as_deref()),
        );
        Ok(Some(Pool::from_stats(pool_id, raw, &base, &quote)))
    }

    /// Pool stats with the price change against one day (43,200 blocks) earlier.
    pub async fn get_pool(&self, pool_id: u32, height: Option<u64>) -> AppResult<Option<Pool>> {
        let Some(mut pool) = self.get_pool_stats(pool_id, height).await? else {
            return Ok(None);
        };
        if pool_id == 1 {
            pool.apply_daily_change(None);
            return Ok(Some(pool));
        }

        let reference = match height {
            Some(h) => h,
            None => self.icx.get_latest_height().await?,
        };
        let previous = match reference.checked_sub(BLOCKS_PER_DAY) {
            Some(h) => self.get_pool_stats(pool_id, Some(h)).await.unwrap_or_else(|e| {
                tracing::debug!(pool_id, error = %e, "No pool stats a day earlier");
                None
            }),
            None => None,
        };
        pool.apply_daily_change(previous.as_ref());
        Ok(Some(pool))
    }

    /// All pools that exist at `height`, ordered by id.
    pub async fn get_pools(&self, height: Option<u64>) -> AppResult<Vec<Pool>> {
        let count = self.get_pool_count(height).await?;
        let mut pools: Vec<Pool> = stream::iter(1..=count)
            .map(|pool_id| async move {
                match self.get_pool(pool_id, height).await {
                    Ok(pool) => pool,
                    Err(e) => {
                        tracing::warn!(pool_id, error = %e, "Failed to fetch pool");
                        None
                    }
                }
            })
            .buffer_unordered(self.max_workers)
            .filter_map(|pool| async move { pool })
            .collect()
            .await;
        pools.sort_by_key(|pool| pool.id);
        Ok(pools)
    }

    /// Quote for a named pool such as `sICX/bnUSD`.
    pub async fn get_price_by_name(&self, pool_name: &str) -> AppResult<Decimal> {
        let price = self
            .icx
            .call_int(
                balanced::DEX_CONTRACT,
                "getPriceByName",
                json!({ "_name": pool_name }),
                None,
            )
            .await?;
        Ok(scale(price, EXA))
    }

    pub async fn get_liquidations(&self, page: u64) -> AppResult<Vec<Liquidation>> {
        let logs = self
            .tracker
            .get_logs(
                balanced::LOANS_CONTRACT,
                "Liquidate",
                LIQUIDATIONS_PAGE_SIZE,
                calculate_skip(page, LIQUIDATIONS_PAGE_SIZE)?,
            )
            .await?;
        Ok(logs.into_iter().map(Liquidation::from).collect())
    }

    /// Stablecoin reserves held by the stability fund.
    pub async fn get_stability_fund(&self) -> AppResult<Vec<(String, Decimal)>> {
        let (iusdc, usds) = tokio::join!(
            self.icx
                .get_irc2_token_balance(balanced::IUSDC_CONTRACT, balanced::STABILITY_FUND_CONTRACT),
            self.icx
                .get_irc2_token_balance(balanced::USDS_CONTRACT, balanced::STABILITY_FUND_CONTRACT),
        );
        Ok(vec![
            ("IUSDC".to_string(), scale(iusdc?, 6)),
            ("USDS".to_string(), scale(usds?, EXA)),
        ])
    }

    /// sICX held by the loans contract.
    pub async fn get_loan_collateral(&self) -> AppResult<Decimal> {
        let balance = self
            .icx
            .get_irc2_token_balance(balanced::SICX_CONTRACT, balanced::LOANS_CONTRACT)
            .await?;
        Ok(scale(balance, EXA))
    }

    /// Outstanding bnUSD, i.e. the total supply.
    pub async fn get_total_debt(&self) -> AppResult<Decimal> {
        let supply = self
            .icx
            .call_int(balanced::BNUSD_CONTRACT, "totalSupply", json!({}), None)
            .await?;
        Ok(scale(supply, EXA))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::http_request::HttpReq;
    use crate::test_support::{call_method, rpc_result, rpc_server};
    use rust_decimal_macros::dec;
    use serde_json::Value;

    fn service(url: &str) -> BalancedService {
        let http = HttpReq::new();
        let icx = IcxService::new(http.clone(), url);
        let tokens = TokensService::new(icx.clone());
        let tracker = TrackerService::new(http, url);
        BalancedService::new(icx, tokens, tracker, 4)
    }

    fn height_of(body: &Value) -> Option<u64> {
        body["params"]["height"]
            .as_str()
            .and_then(|h| u64::from_str_radix(h.trim_start_matches("0x"), 16).ok())
    }

    fn stats(price: &str) -> Value {
        json!({
            "base_token": balanced::SICX_CONTRACT,
            "quote_token": balanced::BNUSD_CONTRACT,
            "base": "0xde0b6b3a7640000",
            "quote": "0xde0b6b3a7640000",
            "base_decimals": "0x12",
            "quote_decimals": "0x12",
            "min_quote": "0x0",
            "price": price,
            "total_supply": "0xde0b6b3a7640000"
        })
    }

    #[tokio::test]
    async fn test_get_pools_with_daily_change() {
        let latest = 100_000u64;
        let (url, _) = rpc_server(move |body| {
            if body["method"] == "icx_getLastBlock" {
                return rpc_result(json!({
                    "height": latest,
                    "block_hash": "00",
                    "time_stamp": 0,
                    "peer_id": "hx00",
                    "confirmed_transaction_list": []
                }));
            }
            match call_method(&body) {
                "getNonce" => rpc_result(json!("0x3")),
                "getPoolStats" => {
                    let id = body["params"]["data"]["params"]["_id"].as_str().unwrap_or_default();
                    let day_ago = height_of(&body) == Some(latest - BLOCKS_PER_DAY);
                    match (id, day_ago) {
                        // Pool 3 was created within the last day.
                        ("0x3", true) => json!({
                            "jsonrpc": "2.0", "id": 1,
                            "error": { "code": -30006, "message": "pool not found" }
                        }),
                        (_, true) => rpc_result(stats("0xde0b6b3a7640000")),
                        _ => rpc_result(stats("0x1bc16d674ec80000")),
                    }
                }
                _ => rpc_result(Value::Null),
            }
        })
        .await;

        let pools = service(&url).get_pools(None).await.unwrap();
        assert_eq!(pools.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(pools[0].price_daily_change_amount, Decimal::ZERO);
        assert_eq!(pools[1].price_daily_change_amount, dec!(1));
        assert_eq!(pools[1].price_daily_change_percent, dec!(1));
        assert_eq!(pools[2].price_daily_change_percent, Decimal::ZERO);
        assert_eq!(pools[1].pool_name, "sICX/bnUSD");
    }

    #[tokio::test]
    async fn test_missing_pool_is_none() {
        let (url, _) = rpc_server(|_| {
            json!({ "jsonrpc": "2.0", "id": 1, "error": { "code": -30006, "message": "x" } })
        })
        .await;
        assert!(service(&url).get_pool_stats(9, Some(10)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_loans_skips_rejected_positions() {
        let (url, hits) = rpc_server(|body| match call_method(&body) {
            "borrowerCount" => rpc_result(json!("0x2")),
            "getPositionAddress" => {
                let index = body["params"]["data"]["params"]["_index"].as_str().unwrap_or_default();
                rpc_result(json!(format!("hx{:0>40}", index.trim_start_matches("0x"))))
            }
            "getAccountPositions" => {
                let owner = body["params"]["data"]["params"]["_owner"].as_str().unwrap_or_default();
                if owner.ends_with('2') {
                    json!({ "jsonrpc": "2.0", "id": 1, "error": { "code": -30032, "message": "no position" } })
                } else {
                    rpc_result(json!({
                        "pos_id": "0x1",
                        "created": "0x0",
                        "address": owner,
                        "assets": { "sICX": "0xde0b6b3a7640000" },
                        "collateral": "0xde0b6b3a7640000",
                        "ratio": "0x29a2241af62c0000",
                        "total_debt": "0x0",
                        "standing": "No Debt"
                    }))
                }
            }
            _ => rpc_result(Value::Null),
        })
        .await;

        let balanced = service(&url);
        let loans = balanced.get_loans().await.unwrap();
        assert_eq!(loans.len(), 1);
        assert_eq!(loans[0].ratio, dec!(3));
        let calls = hits.load(std::sync::atomic::Ordering::SeqCst);

        // Addresses are cached after the first pass.
        balanced.get_loans().await.unwrap();
        assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), calls * 2 - 2);
    }

    #[tokio::test]
    async fn test_stability_fund_decimals() {
        let (url, _) = rpc_server(|body| {
            let token = body["params"]["to"].as_str().unwrap_or_default();
            if token == balanced::IUSDC_CONTRACT {
                rpc_result(json!("0x2dc6c0")) // 3 IUSDC
            } else {
                rpc_result(json!("0x29a2241af62c0000")) // 3 USDS
            }
        })
        .await;
        let fund = service(&url).get_stability_fund().await.unwrap();
        assert_eq!(fund, vec![("IUSDC".to_string(), dec!(3)), ("USDS".to_string(), dec!(3))]);
    }

    #[tokio::test]
    async fn test_total_debt_is_bnusd_supply() {
        let (url, _) = rpc_server(|body| {
            assert_eq!(body["params"]["to"], balanced::BNUSD_CONTRACT);
            assert_eq!(call_method(&body), "totalSupply");
            rpc_result(json!("0x29a2241af62c0000"))
        })
        .await;
        assert_eq!(service(&url).get_total_debt().await.unwrap(), dec!(3));
    }
}
