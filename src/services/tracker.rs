//! Block explorer REST API client.

use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::models::icx::{
    Contract, Log, TokenTransfer, TrackerBlock, TrackerContract, TrackerLog, TrackerPrep,
    TrackerTokenTransfer, TrackerTransaction, TrackerTransactionDetail, Transaction,
    TransactionLog,
};
use crate::services::http_request::{HttpReq, total_count};

const ADDRESS_DETAILS_ENDPOINT: &str = "https://tracker.icon.community/api/v1/addresses/details";
const MAIN_INFO_ENDPOINT: &str = "https://main.tracker.solidwallet.io/v3/main/mainInfo";

/// Query for the `/transactions` listing. Unset filters are omitted.
#[derive(Debug, Clone)]
pub struct TransactionFilter {
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    pub kind: String,
    pub block_number: Option<u64>,
    pub start_block_number: Option<u64>,
    pub end_block_number: Option<u64>,
    pub method: Option<String>,
    pub limit: u64,
    pub skip: u64,
    pub sort: String,
}

impl Default for TransactionFilter {
    fn default() -> Self {
        Self {
            from_address: None,
            to_address: None,
            kind: "transaction".to_string(),
            block_number: None,
            start_block_number: None,
            end_block_number: None,
            method: None,
            limit: 25,
            skip: 0,
            sort: "desc".to_string(),
        }
    }
}

impl TransactionFilter {
    pub fn query_string(&self) -> String {
        let mut query = format!(
            "limit={}&skip={}&sort={}&type={}",
            self.limit, self.skip, self.sort, self.kind
        );
        if let Some(from) = &self.from_address {
            query.push_str(&format!("&from={}", from));
        }
        if let Some(to) = &self.to_address {
            query.push_str(&format!("&to={}", to));
        }
        if let Some(block_number) = self.block_number {
            query.push_str(&format!("&block_number={}", block_number));
        }
        if let Some(start) = self.start_block_number {
            query.push_str(&format!("&start_block_number={}", start));
        }
        if let Some(end) = self.end_block_number {
            query.push_str(&format!("&end_block_number={}", end));
        }
        if let Some(method) = &self.method {
            query.push_str(&format!("&method={}", method));
        }
        query
    }
}

#[derive(Debug, Clone, Default, Deserialize, serde::Serialize)]
pub struct AddressDetails {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub transaction_count: i64,
    #[serde(default)]
    pub token_transfer_count: i64,
    #[serde(default)]
    pub log_count: i64,
    #[serde(default)]
    pub is_contract: bool,
    #[serde(default)]
    pub is_prep: bool,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BlockNumber {
    number: u64,
}

#[derive(Debug, Deserialize)]
struct MainInfo {
    #[serde(rename = "tmainInfo")]
    main_info: MarketInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarketInfo {
    market_cap: f64,
}

#[derive(Clone)]
pub struct TrackerService {
    http: HttpReq,
    base_url: String,
    address_details_url: String,
    main_info_url: String,
}

impl TrackerService {
    pub fn new(http: HttpReq, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            address_details_url: ADDRESS_DETAILS_ENDPOINT.to_string(),
            main_info_url: MAIN_INFO_ENDPOINT.to_string(),
        }
    }

    /// Points the address-details lookup at another host.
    pub fn with_address_details_url(mut self, url: &str) -> Self {
        self.address_details_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Points the market-cap lookup at another host.
    pub fn with_main_info_url(mut self, url: &str) -> Self {
        self.main_info_url = url.to_string();
        self
    }

    async fn head_total(&self, path: &str) -> AppResult<u64> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .head(&url)
            .await
            .ok_or_else(|| AppError::Unavailable(url.clone()))?;
        total_count(&response).ok_or_else(|| AppError::Decode(format!("{}: no x-total-count", url)))
    }

    pub async fn get_address_details(&self, address: &str) -> AppResult<AddressDetails> {
        let url = format!("{}/{}/", self.address_details_url, address);
        self.http.get_json(&url, None).await
    }

    pub async fn get_address_transactions(
        &self,
        address: &str,
        limit: u64,
        skip: u64,
    ) -> AppResult<Vec<Transaction>> {
        let url = format!(
            "{}/transactions/address/{}/?limit={}&skip={}",
            self.base_url, address, limit, skip
        );
        let raw: Vec<TrackerTransaction> = self.http.get_json(&url, None).await?;
        Ok(raw.into_iter().map(Transaction::from).collect())
    }

    /// Height of the block at `timestamp_s` (seconds since epoch).
    pub async fn get_block_from_timestamp(&self, timestamp_s: i64) -> AppResult<u64> {
        let url = format!(
            "{}/blocks/timestamp/{}/",
            self.base_url,
            timestamp_s * 1_000_000
        );
        let block: BlockNumber = self.http.get_json(&url, None).await?;
        Ok(block.number)
    }

    pub async fn get_blocks_raw(&self, limit: u64, sort: &str) -> AppResult<Vec<TrackerBlock>> {
        let url = format!("{}/blocks?limit={}&sort={}", self.base_url, limit, sort);
        self.http.get_json(&url, None).await
    }

    pub async fn get_contracts(
        &self,
        limit: u64,
        skip: u64,
        token_standard: Option<&str>,
    ) -> AppResult<Vec<Contract>> {
        let mut url = format!(
            "{}/addresses/contracts?limit={}&skip={}",
            self.base_url, limit, skip
        );
        if let Some(standard) = token_standard {
            url.push_str(&format!("&token_standard={}", standard));
        }
        let raw: Vec<TrackerContract> = self.http.get_json(&url, None).await?;
        Ok(raw.into_iter().map(Contract::from).collect())
    }

    /// ICX market cap in USD, from the legacy tracker.
    pub async fn get_market_cap(&self) -> AppResult<f64> {
        let info: MainInfo = self.http.get_json(&self.main_info_url, None).await?;
        Ok(info.main_info.market_cap)
    }

    pub async fn get_logs(
        &self,
        address: &str,
        method: &str,
        limit: u64,
        skip: u64,
    ) -> AppResult<Vec<Log>> {
        let url = format!(
            "{}/logs/?limit={}&skip={}&address={}&method={}",
            self.base_url, limit, skip, address, method
        );
        let raw: Vec<TrackerLog> = self.http.get_json(&url, None).await?;
        Ok(raw.into_iter().map(Log::from).collect())
    }

    pub async fn get_token_transfers(
        &self,
        limit: u64,
        skip: u64,
        sort: &str,
    ) -> AppResult<Vec<TokenTransfer>> {
        let url = format!(
            "{}/transactions/token-transfers?limit={}&skip={}&sort={}&type=transaction",
            self.base_url, limit, skip, sort
        );
        let raw: Vec<TrackerTokenTransfer> = self.http.get_json(&url, None).await?;
        Ok(raw.into_iter().map(TokenTransfer::from).collect())
    }

    pub async fn get_total_token_transfers(&self) -> AppResult<u64> {
        self.head_total("/transactions/token-transfers").await
    }

    pub async fn get_total_transactions(&self) -> AppResult<u64> {
        self.head_total("/transactions").await
    }

    pub async fn get_transaction_details(&self, tx_hash: &str) -> AppResult<TrackerTransactionDetail> {
        let url = format!("{}/transactions/details/{}", self.base_url, tx_hash);
        self.http.get_json(&url, None).await
    }

    /// Logs emitted by `tx_hash`, ordered by log index.
    pub async fn get_transaction_logs(&self, tx_hash: &str) -> AppResult<Vec<TransactionLog>> {
        let url = format!("{}/logs?transaction_hash={}", self.base_url, tx_hash);
        let raw: Vec<TrackerLog> = self.http.get_json(&url, None).await?;
        let mut logs: Vec<TransactionLog> = raw.into_iter().map(TransactionLog::from).collect();
        logs.sort_by_key(|log| log.log_index);
        Ok(logs)
    }

    pub async fn get_transactions_raw(
        &self,
        filter: &TransactionFilter,
    ) -> AppResult<Vec<TrackerTransaction>> {
        let url = format!("{}/transactions?{}", self.base_url, filter.query_string());
        self.http.get_json(&url, None).await
    }

    pub async fn get_transactions(&self, filter: &TransactionFilter) -> AppResult<Vec<Transaction>> {
        Ok(self
            .get_transactions_raw(filter)
            .await?
            .into_iter()
            .map(Transaction::from)
            .collect())
    }

    /// Validators, highest power first.
    pub async fn get_validators(&self) -> AppResult<Vec<TrackerPrep>> {
        let url = format!("{}/governance/preps", self.base_url);
        let mut validators: Vec<TrackerPrep> = self.http.get_json(&url, None).await?;
        validators.sort_by(|a, b| b.power.total_cmp(&a.power));
        Ok(validators)
    }

    /// Liveness of the tracker API, checked with a short HEAD on `/status/`.
    pub async fn is_up(&self) -> bool {
        let url = format!("{}/status/", self.base_url);
        match self.http.head_with(&url, Duration::from_secs(2), 1).await {
            Some(response) => {
                response.status() == StatusCode::NO_CONTENT || response.status().is_success()
            }
            None => false,
        }
    }
}
