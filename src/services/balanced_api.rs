//! Balanced stats REST API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::config::EXA;
use crate::error::{AppError, AppResult};
use crate::services::http_request::HttpReq;
use crate::services::tokens::TokensService;
use crate::utils::{parse_number, scale, scale_hex};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaoFundBalance {
    pub symbol: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalValueLocked {
    pub total_value_locked_usd: Decimal,
    pub dex_value_locked_usd: Decimal,
    pub loans_value_locked_usd: Decimal,
}

#[derive(Debug, Deserialize)]
struct RawTotalValueLocked {
    total_value_locked_usd: String,
    dex_value_locked_usd: String,
    loans_value_locked_usd: String,
}

/// Pool name -> side -> raw volume.
pub type ExchangeVolume = BTreeMap<String, BTreeMap<String, i128>>;

#[derive(Clone)]
pub struct BalancedApiService {
    http: HttpReq,
    base_url: String,
    tokens: TokensService,
}

impl BalancedApiService {
    pub fn new(http: HttpReq, base_url: &str, tokens: TokensService) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    async fn get_stats<T: serde::de::DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let url = format!("{}/stats/{}", self.base_url, path);
        self.http.get_json(&url, None).await
    }

    pub async fn get_borrower_count(&self) -> AppResult<u64> {
        let data: Value = self.get_stats("num-borrowers").await?;
        data["num_borrowers"]
            .as_str()
            .and_then(parse_number)
            .map(|n| n.max(0) as u64)
            .ok_or_else(|| AppError::Decode("num-borrowers: missing num_borrowers".to_string()))
    }

    /// Current DAO fund holdings, ordered by symbol (case-insensitive).
    pub async fn get_daofund_balance_sheet(&self) -> AppResult<Vec<DaoFundBalance>> {
        let data: BTreeMap<String, String> = self
            .get_stats("daofund-balance-sheet?timestamp=-1")
            .await?;

        let mut balance_sheet = Vec::with_capacity(data.len());
        for (contract, amount) in data {
            let token = self.tokens.get_token_info(Some(&contract)).await;
            balance_sheet.push(DaoFundBalance {
                symbol: token.symbol,
                amount: scale_hex(&amount, token.decimals),
            });
        }
        balance_sheet.sort_by_key(|b| b.symbol.to_lowercase());
        Ok(balance_sheet)
    }

    pub async fn get_24h_exchange_volume(&self) -> AppResult<ExchangeVolume> {
        let data: BTreeMap<String, BTreeMap<String, String>> =
            self.get_stats("exchange-volume-24h").await?;
        Ok(data
            .into_iter()
            .map(|(pool, sides)| {
                let sides = sides
                    .into_iter()
                    .map(|(side, volume)| (side, parse_number(&volume).unwrap_or_default()))
                    .collect();
                (pool, sides)
            })
            .collect())
    }

    pub async fn get_total_transactions(&self) -> AppResult<Value> {
        self.get_stats("total-transactions").await
    }

    pub async fn get_total_value_locked(&self) -> AppResult<TotalValueLocked> {
        let raw: RawTotalValueLocked = self.get_stats("total-value-locked").await?;
        let usd = |v: &str| parse_number(v).map(|n| scale(n, EXA)).unwrap_or_default();
        Ok(TotalValueLocked {
            total_value_locked_usd: usd(&raw.total_value_locked_usd),
            dex_value_locked_usd: usd(&raw.dex_value_locked_usd),
            loans_value_locked_usd: usd(&raw.loans_value_locked_usd),
        })
    }
}
