//! ICON JSON-RPC client.

use moka::future::Cache;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{CHAIN_CONTRACT, PRICE_ORACLE_CONTRACT};
use crate::error::{AppError, AppResult};
use crate::models::icx::{ChainBlock, ChainTransaction, ChainTransactionResult, NetworkInfo, ScoreApiEntry};
use crate::services::http_request::{DEFAULT_RETRIES, DEFAULT_TIMEOUT, HttpReq};
use crate::utils::{parse_number, scale};

/// Attempts made by [`IcxService::call`] before giving up.
const CALL_ATTEMPTS: u32 = 6;
const CALL_RETRY_DELAY: Duration = Duration::from_secs(2);

#[derive(Clone)]
pub struct IcxService {
    http: HttpReq,
    rpc_url: String,
    retry_delay: Duration,
    price_cache: Arc<Cache<(), Decimal>>,
    network_info_cache: Arc<Cache<(), NetworkInfo>>,
}

impl IcxService {
    pub fn new(http: HttpReq, api_endpoint: &str) -> Self {
        Self {
            http,
            rpc_url: format!("{}/api/v3", api_endpoint.trim_end_matches('/')),
            retry_delay: CALL_RETRY_DELAY,
            price_cache: Arc::new(
                Cache::builder()
                    .max_capacity(1)
                    .time_to_live(Duration::from_secs(30))
                    .build(),
            ),
            network_info_cache: Arc::new(
                Cache::builder()
                    .max_capacity(1)
                    .time_to_live(Duration::from_secs(30))
                    .build(),
            ),
        }
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Raw JSON-RPC request. Transport failures map to `Unavailable`, RPC
    /// error objects to `Rpc`.
    pub async fn rpc(&self, method: &str, params: Option<Value>) -> AppResult<Value> {
        self.rpc_with(method, params, DEFAULT_RETRIES).await
    }

    /// `rpc` with an explicit number of transport retries on connect failure.
    async fn rpc_with(&self, method: &str, params: Option<Value>, retries: u32) -> AppResult<Value> {
        let mut body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
        });
        if let Some(params) = params {
            body["params"] = params;
        }

        let response = self
            .http
            .post_with(&self.rpc_url, &body, DEFAULT_TIMEOUT, retries)
            .await
            .ok_or_else(|| AppError::Unavailable(format!("{} {}", self.rpc_url, method)))?;

        let mut payload: Value = response.json().await?;
        if let Some(error) = payload.get("error") {
            return Err(AppError::Rpc {
                code: error.get("code").and_then(Value::as_i64).unwrap_or_default(),
                message: error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            });
        }

        match payload.get_mut("result") {
            Some(result) => Ok(result.take()),
            None => Err(AppError::Decode(format!("{}: missing result", method))),
        }
    }

    /// Read-only contract call (`icx_call`), retried on connection failures.
    pub async fn call(
        &self,
        to: &str,
        method: &str,
        params: Value,
        height: Option<u64>,
    ) -> AppResult<Value> {
        let mut rpc_params = json!({
            "to": to,
            "dataType": "call",
            "data": {
                "method": method,
                "params": params,
            },
        });
        if let Some(height) = height {
            rpc_params["height"] = json!(format!("0x{:x}", height));
        }

        // The loop owns retrying, so each attempt is a single request.
        let mut attempt = 0;
        loop {
            match self.rpc_with("icx_call", Some(rpc_params.clone()), 0).await {
                Err(AppError::Unavailable(_)) if attempt + 1 < CALL_ATTEMPTS => {
                    attempt += 1;
                    tracing::debug!(%to, %method, attempt, "icx_call failed to connect, retrying");
                    tokio::time::sleep(self.retry_delay).await;
                }
                result => return result,
            }
        }
    }

    pub async fn call_as<T: DeserializeOwned>(
        &self,
        to: &str,
        method: &str,
        params: Value,
        height: Option<u64>,
    ) -> AppResult<T> {
        let value = self.call(to, method, params, height).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Hex-encoded integer result of a contract call.
    pub async fn call_int(
        &self,
        to: &str,
        method: &str,
        params: Value,
        height: Option<u64>,
    ) -> AppResult<i128> {
        let value = self.call(to, method, params, height).await?;
        value
            .as_str()
            .and_then(parse_number)
            .ok_or_else(|| AppError::Decode(format!("{}: expected hex integer, got {}", method, value)))
    }

    /// Latest block when `height` is `None`.
    pub async fn get_block(&self, height: Option<u64>) -> AppResult<ChainBlock> {
        let result = match height {
            Some(h) => {
                self.rpc(
                    "icx_getBlockByHeight",
                    Some(json!({ "height": format!("0x{:x}", h) })),
                )
                .await?
            }
            None => self.rpc("icx_getLastBlock", None).await?,
        };
        Ok(serde_json::from_value(result)?)
    }

    pub async fn get_latest_height(&self) -> AppResult<u64> {
        Ok(self.get_block(None).await?.height)
    }

    /// Contract ABI, optionally as of `height`.
    pub async fn get_score_api(&self, address: &str, height: Option<u64>) -> AppResult<Vec<ScoreApiEntry>> {
        let mut params = json!({ "address": address });
        if let Some(height) = height {
            params["height"] = json!(format!("0x{:x}", height));
        }
        let result = self.rpc("icx_getScoreApi", Some(params)).await?;
        Ok(serde_json::from_value(result)?)
    }

    pub async fn get_transaction(&self, tx_hash: &str) -> AppResult<ChainTransaction> {
        let result = self
            .rpc("icx_getTransactionByHash", Some(json!({ "txHash": tx_hash })))
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    pub async fn get_transaction_result(&self, tx_hash: &str) -> AppResult<ChainTransactionResult> {
        let result = self
            .rpc("icx_getTransactionResult", Some(json!({ "txHash": tx_hash })))
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    /// ICX/USD from the price oracle. Only the current price is cached.
    pub async fn get_icx_usd_price(&self, height: Option<u64>) -> AppResult<Decimal> {
        if height.is_none() {
            if let Some(price) = self.price_cache.get(&()).await {
                return Ok(price);
            }
        }

        let result = self
            .call(
                PRICE_ORACLE_CONTRACT,
                "get_ref_data",
                json!({ "_symbol": "ICX" }),
                height,
            )
            .await?;
        let rate = result
            .get("rate")
            .and_then(Value::as_str)
            .and_then(parse_number)
            .ok_or_else(|| AppError::Decode("get_ref_data: missing rate".to_string()))?;
        let price = scale(rate, 9);

        if height.is_none() {
            self.price_cache.insert((), price).await;
        }
        Ok(price)
    }

    pub async fn get_network_info(&self) -> AppResult<NetworkInfo> {
        if let Some(info) = self.network_info_cache.get(&()).await {
            return Ok(info);
        }
        let info: NetworkInfo = self
            .call_as(CHAIN_CONTRACT, "getNetworkInfo", json!({}), None)
            .await?;
        self.network_info_cache.insert((), info.clone()).await;
        Ok(info)
    }

    /// Raw (unscaled) IRC-2 balance.
    pub async fn get_irc2_token_balance(&self, token_contract: &str, address: &str) -> AppResult<i128> {
        self.call_int(token_contract, "balanceOf", json!({ "_owner": address }), None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{rpc_server, rpc_result};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_icx_usd_price_is_scaled_and_cached() {
        let (url, hits) = rpc_server(|body| match body["method"].as_str() {
            Some("icx_call") => rpc_result(json!({ "rate": "0x1dcd6500" })),
            _ => json!({ "jsonrpc": "2.0", "id": 1, "error": { "code": -32601, "message": "no" } }),
        })
        .await;
        let icx = IcxService::new(HttpReq::new(), &url);

        assert_eq!(icx.get_icx_usd_price(None).await.unwrap(), dec!(0.5));
        assert_eq!(icx.get_icx_usd_price(None).await.unwrap(), dec!(0.5));
        assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rpc_error_is_surfaced() {
        let (url, _) = rpc_server(|_| {
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": { "code": -30006, "message": "pool not found" }
            })
        })
        .await;
        let icx = IcxService::new(HttpReq::new(), &url);

        let err = icx
            .call("cx00", "getPoolStats", json!({ "_id": "0x1" }), Some(10))
            .await
            .unwrap_err();
        assert_eq!(err.rpc_code(), Some(AppError::SCORE_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_get_block_latest() {
        let (url, _) = rpc_server(|body| {
            assert_eq!(body["method"], "icx_getLastBlock");
            rpc_result(json!({
                "height": 1234,
                "block_hash": "abcd",
                "time_stamp": 1_650_000_000_000_000i64,
                "peer_id": "hx00",
                "confirmed_transaction_list": []
            }))
        })
        .await;
        let icx = IcxService::new(HttpReq::new(), &url);
        assert_eq!(icx.get_latest_height().await.unwrap(), 1234);
    }

    #[tokio::test]
    async fn test_call_gives_up_after_retries() {
        let icx = IcxService::new(HttpReq::new(), "http://127.0.0.1:9")
            .with_retry_delay(Duration::from_millis(1));
        let err = icx
            .call(CHAIN_CONTRACT, "getNetworkInfo", json!({}), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_call_sends_one_request_per_attempt() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        // Accepts and drops every connection, so each request fails.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicUsize::new(0));
        let counter = accepted.clone();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                drop(socket);
            }
        });

        let icx = IcxService::new(HttpReq::new(), &format!("http://{}", addr))
            .with_retry_delay(Duration::from_millis(1));
        let err = icx
            .call(CHAIN_CONTRACT, "getNetworkInfo", json!({}), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unavailable(_)));
        assert_eq!(accepted.load(Ordering::SeqCst), CALL_ATTEMPTS as usize);
    }

    #[tokio::test]
    async fn test_score_api_and_transaction_lookups() {
        let (url, _) = rpc_server(|body| match body["method"].as_str() {
            Some("icx_getScoreApi") => {
                assert_eq!(body["params"]["height"], "0x10");
                rpc_result(json!([
                    { "type": "function", "name": "balanceOf", "readonly": "0x1", "inputs": [] },
                    { "type": "eventlog", "name": "Transfer", "inputs": [] }
                ]))
            }
            Some("icx_getTransactionByHash") => rpc_result(json!({
                "txHash": body["params"]["txHash"],
                "blockHeight": "0x64",
                "from": "hx01",
                "to": "cx02",
                "value": "0xde0b6b3a7640000"
            })),
            Some("icx_getTransactionResult") => rpc_result(json!({
                "txHash": body["params"]["txHash"],
                "blockHeight": "0x64",
                "status": "0x0",
                "failure": { "code": "0x7d64", "message": "out of step" }
            })),
            _ => json!({ "jsonrpc": "2.0", "id": 1, "error": { "code": -32601, "message": "no" } }),
        })
        .await;
        let icx = IcxService::new(HttpReq::new(), &url);

        let api = icx.get_score_api("cx02", Some(16)).await.unwrap();
        assert!(api[0].is_function() && api[0].is_readonly());
        assert!(!api[1].is_function() && !api[1].is_readonly());

        let tx = icx.get_transaction("0xab").await.unwrap();
        assert_eq!(tx.block_height, 100);
        assert_eq!(tx.value, 1_000_000_000_000_000_000);

        let receipt = icx.get_transaction_result("0xab").await.unwrap();
        assert_eq!(receipt.tx_hash, "0xab");
        assert_eq!(receipt.status, 0);
        assert!(receipt.failure.is_some());
    }
}
