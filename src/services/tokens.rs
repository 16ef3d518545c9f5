//! Token metadata lookups: static table first, then the token contract itself.

use moka::future::Cache;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

use crate::config::EXA;
use crate::data::tokens::{self, TokenMetadata};
use crate::models::balanced::TokenInfo;
use crate::services::icx::IcxService;
use crate::utils::parse_number;

/// Placeholder for metadata the contract would not return.
pub const UNKNOWN: &str = "NULL";

impl From<&TokenMetadata> for TokenInfo {
    fn from(metadata: &TokenMetadata) -> Self {
        Self {
            symbol: metadata.symbol.to_string(),
            name: metadata.name.to_string(),
            decimals: metadata.decimals,
        }
    }
}

#[derive(Clone)]
pub struct TokensService {
    icx: IcxService,
    cache: Arc<Cache<String, TokenInfo>>,
}

impl TokensService {
    pub fn new(icx: IcxService) -> Self {
        Self {
            icx,
            cache: Arc::new(
                Cache::builder()
                    .max_capacity(1_000)
                    .time_to_live(Duration::from_secs(86_400))
                    .build(),
            ),
        }
    }

    /// Metadata for `contract`; `None` means native ICX.
    pub async fn get_token_info(&self, contract: Option<&str>) -> TokenInfo {
        let Some(contract) = contract else {
            return TokenInfo::icx();
        };
        if let Some(metadata) = tokens::lookup(contract) {
            return metadata.into();
        }
        if let Some(info) = self.cache.get(contract).await {
            return info;
        }

        let (name, symbol, decimals) = tokio::join!(
            self.icx.call(contract, "name", json!({}), None),
            self.icx.call(contract, "symbol", json!({}), None),
            self.icx.call(contract, "decimals", json!({}), None),
        );
        let resolved = name.is_ok() && symbol.is_ok();
        let info = TokenInfo {
            name: text_or_unknown(name.ok()),
            symbol: text_or_unknown(symbol.ok()),
            decimals: decimals
                .ok()
                .as_ref()
                .and_then(Value::as_str)
                .and_then(parse_number)
                .map(|d| d as u32)
                .unwrap_or(EXA),
        };

        if resolved {
            self.cache.insert(contract.to_string(), info.clone()).await;
        } else {
            tracing::warn!(%contract, "Could not resolve token metadata on-chain");
        }
        info
    }

    pub async fn get_token_symbol(&self, contract: Option<&str>) -> String {
        self.get_token_info(contract).await.symbol
    }
}

fn text_or_unknown(value: Option<Value>) -> String {
    value
        .as_ref()
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::http_request::HttpReq;
    use crate::test_support::{call_method, rpc_result, rpc_server};

    #[tokio::test]
    async fn test_static_table_and_icx() {
        let icx = IcxService::new(HttpReq::new(), "http://127.0.0.1:9");
        let tokens = TokensService::new(icx);

        assert_eq!(tokens.get_token_symbol(None).await, "ICX");
        let sicx = tokens
            .get_token_info(Some("cx2609b924e33ef00b648a409245c7ea394c467824"))
            .await;
        assert_eq!(sicx.name, "Staked ICX");
    }

    #[tokio::test]
    async fn test_on_chain_fallback_is_cached() {
        let (url, hits) = rpc_server(|body| match call_method(&body) {
            "name" => rpc_result(json!("Gang Token")),
            "symbol" => rpc_result(json!("GANG")),
            "decimals" => rpc_result(json!("0x12")),
            _ => rpc_result(Value::Null),
        })
        .await;
        let tokens = TokensService::new(IcxService::new(HttpReq::new(), &url));
        let contract = Some("cx2222222222222222222222222222222222222222");

        let info = tokens.get_token_info(contract).await;
        assert_eq!(info.symbol, "GANG");
        assert_eq!(info.decimals, 18);
        tokens.get_token_info(contract).await;
        assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_unresolvable_token() {
        let (url, _) = rpc_server(|_| {
            json!({ "jsonrpc": "2.0", "id": 1, "error": { "code": -32000, "message": "not a token" } })
        })
        .await;
        let tokens = TokensService::new(IcxService::new(HttpReq::new(), &url));
        let info = tokens
            .get_token_info(Some("cx1111111111111111111111111111111111111111"))
            .await;
        assert_eq!(info.symbol, UNKNOWN);
        assert_eq!(info.name, UNKNOWN);
    }
}
