//! Chain and tracker records, and their `{default, formatted}` views.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::EXA;
use crate::data::addresses::{self, AddressType};
use crate::models::de::{empty_as_none, flexible_i128, flexible_i64, flexible_u64, optional_i64};
use crate::models::formatted::{Formatted, JsonData, Timestamp};
use crate::utils::{convert_country_code_to_hex, parse_number, scale, scale_hex};

// ---------------------------------------------------------------------------
// Chain RPC
// ---------------------------------------------------------------------------

/// Block as returned by `icx_getLastBlock` / `icx_getBlockByHeight`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainBlock {
    #[serde(deserialize_with = "flexible_u64")]
    pub height: u64,
    #[serde(default)]
    pub block_hash: String,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub time_stamp: i64,
    #[serde(default)]
    pub peer_id: String,
    #[serde(default)]
    pub confirmed_transaction_list: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RewardFund {
    #[serde(rename = "Iglobal", default, deserialize_with = "flexible_i128")]
    pub i_global: i128,
    #[serde(rename = "Iprep", default, deserialize_with = "flexible_i128")]
    pub i_prep: i128,
    #[serde(rename = "Icps", default, deserialize_with = "flexible_i128")]
    pub i_cps: i128,
    #[serde(rename = "Irelay", default, deserialize_with = "flexible_i128")]
    pub i_relay: i128,
    #[serde(rename = "Ivoter", default, deserialize_with = "flexible_i128")]
    pub i_voter: i128,
}

/// `getNetworkInfo` on the chain contract, hex values decoded.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    #[serde(default, deserialize_with = "flexible_i64")]
    pub preps: i64,
    #[serde(rename = "mainPRepCount", default, deserialize_with = "flexible_i64")]
    pub main_prep_count: i64,
    #[serde(rename = "extraMainPRepCount", default, deserialize_with = "flexible_i64")]
    pub extra_main_prep_count: i64,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub bond_requirement: i64,
    #[serde(default)]
    pub reward_fund: RewardFund,
    #[serde(default, deserialize_with = "flexible_i128")]
    pub total_bonded: i128,
    #[serde(default, deserialize_with = "flexible_i128")]
    pub total_delegated: i128,
    #[serde(default, deserialize_with = "flexible_i128")]
    pub total_stake: i128,
    #[serde(default, deserialize_with = "flexible_i128")]
    pub total_power: i128,
}

impl NetworkInfo {
    /// Yearly voter reward over total delegation, rounded to 8 places.
    pub fn staking_apy(&self) -> Decimal {
        if self.total_delegated == 0 {
            return Decimal::ZERO;
        }
        let voter_allocation = scale(self.reward_fund.i_global, 0)
            * (scale(self.reward_fund.i_voter, 0) / Decimal::ONE_HUNDRED)
            * Decimal::from(12);
        (voter_allocation / scale(self.total_delegated, 0)).round_dp(8)
    }

    pub fn staked_delegated_supply(&self) -> StakedDelegatedSupply {
        StakedDelegatedSupply {
            delegated_supply: scale(self.total_delegated, EXA),
            staked_supply: scale(self.total_stake, EXA),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StakedDelegatedSupply {
    pub delegated_supply: Decimal,
    pub staked_supply: Decimal,
}

/// One entry of `icx_getScoreApi`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScoreApiEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub readonly: Option<String>,
    #[serde(default)]
    pub inputs: Vec<Value>,
}

impl ScoreApiEntry {
    pub fn is_function(&self) -> bool {
        self.kind == "function"
    }

    pub fn is_readonly(&self) -> bool {
        self.readonly.as_deref() == Some("0x1")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainTransaction {
    pub tx_hash: String,
    #[serde(default, deserialize_with = "flexible_u64")]
    pub block_height: u64,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default, deserialize_with = "flexible_i128")]
    pub value: i128,
}

/// Receipt from `icx_getTransactionResult`. `status` is 1 on success.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainTransactionResult {
    pub tx_hash: String,
    #[serde(deserialize_with = "flexible_u64")]
    pub block_height: u64,
    #[serde(deserialize_with = "flexible_i64")]
    pub status: i64,
    #[serde(default)]
    pub failure: Option<Value>,
}

// ---------------------------------------------------------------------------
// Tracker API records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct TrackerBlock {
    pub hash: String,
    #[serde(deserialize_with = "flexible_i64")]
    pub number: i64,
    #[serde(default)]
    pub peer_id: String,
    #[serde(deserialize_with = "flexible_i64")]
    pub timestamp: i64,
    #[serde(default)]
    pub transaction_amount: String,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub transaction_count: i64,
    #[serde(default)]
    pub transaction_fees: String,
}

/// Entry of the tracker's `/governance/preps` listing.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TrackerPrep {
    pub address: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub power: f64,
    #[serde(default)]
    pub status: String,
}

/// Block cached in the `recent_blocks` table.
#[derive(Debug, Clone, Serialize)]
pub struct RecentBlock {
    pub hash: String,
    pub number: Formatted<i64>,
}

impl RecentBlock {
    pub fn new(number: i64, hash: String) -> Self {
        Self {
            hash,
            number: Formatted::count(number),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackerContract {
    pub address: String,
    #[serde(default)]
    pub balance: Option<f64>,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub created_timestamp: i64,
    #[serde(default)]
    pub is_token: bool,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub log_count: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub token_standard: Option<String>,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub transaction_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Contract {
    pub address: String,
    pub balance: Formatted<Decimal>,
    pub created_timestamp: Timestamp,
    pub is_token: bool,
    pub log_count: i64,
    pub name: String,
    pub status: String,
    pub token_standard: String,
    pub transaction_count: Formatted<i64>,
}

impl From<TrackerContract> for Contract {
    fn from(raw: TrackerContract) -> Self {
        let balance = raw
            .balance
            .and_then(Decimal::from_f64_retain)
            .unwrap_or_default();
        Self {
            address: raw.address,
            balance: Formatted::number(balance),
            created_timestamp: Timestamp::from_micros(raw.created_timestamp),
            is_token: raw.is_token,
            log_count: raw.log_count,
            name: raw.name.unwrap_or_default(),
            status: raw.status.unwrap_or_default(),
            token_standard: raw.token_standard.unwrap_or_default(),
            transaction_count: Formatted::count(raw.transaction_count),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackerLog {
    pub address: String,
    #[serde(deserialize_with = "flexible_i64")]
    pub block_number: i64,
    #[serde(deserialize_with = "flexible_i64")]
    pub block_timestamp: i64,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub indexed: String,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub log_index: i64,
    #[serde(default)]
    pub method: String,
    pub transaction_hash: String,
}

/// Event log with its `data` and `indexed` arrays decoded.
#[derive(Debug, Clone, Serialize)]
pub struct Log {
    pub address: String,
    pub block_number: i64,
    pub block_timestamp: Timestamp,
    pub data: Vec<Value>,
    pub indexed: Vec<Value>,
    pub log_index: i64,
    pub method: String,
    pub transaction_hash: String,
}

fn decode_json_array(raw: &str) -> Vec<Value> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items,
        Ok(Value::Null) | Err(_) => Vec::new(),
        Ok(other) => vec![other],
    }
}

impl From<TrackerLog> for Log {
    fn from(raw: TrackerLog) -> Self {
        Self {
            data: decode_json_array(&raw.data),
            indexed: decode_json_array(&raw.indexed),
            address: raw.address,
            block_number: raw.block_number,
            block_timestamp: Timestamp::from_micros(raw.block_timestamp).with_relative(),
            log_index: raw.log_index,
            method: raw.method,
            transaction_hash: raw.transaction_hash,
        }
    }
}

impl Log {
    /// Hex item of `indexed` at `index`, as an integer.
    pub fn indexed_int(&self, index: usize) -> Option<i128> {
        self.indexed.get(index)?.as_str().and_then(parse_number)
    }

    pub fn indexed_str(&self, index: usize) -> Option<&str> {
        self.indexed.get(index)?.as_str()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackerTokenTransfer {
    #[serde(deserialize_with = "flexible_i64")]
    pub block_number: i64,
    #[serde(deserialize_with = "flexible_i64")]
    pub block_timestamp: i64,
    #[serde(default)]
    pub from_address: String,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub log_index: i64,
    #[serde(default)]
    pub to_address: String,
    pub token_contract_address: String,
    #[serde(default)]
    pub token_contract_name: String,
    #[serde(default)]
    pub token_contract_symbol: String,
    #[serde(default)]
    pub transaction_fee: String,
    pub transaction_hash: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub value_decimal: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenTransfer {
    pub block_number: i64,
    pub block_timestamp: Timestamp,
    pub from_address: String,
    pub log_index: i64,
    pub to_address: String,
    pub token_contract_address: String,
    pub token_contract_name: String,
    pub token_contract_symbol: String,
    pub transaction_fee: String,
    pub transaction_hash: String,
    pub value: String,
    pub value_decimal: Formatted<Decimal>,
}

impl From<TrackerTokenTransfer> for TokenTransfer {
    fn from(raw: TrackerTokenTransfer) -> Self {
        let value_decimal = raw
            .value_decimal
            .and_then(Decimal::from_f64_retain)
            .unwrap_or_default();
        Self {
            block_number: raw.block_number,
            block_timestamp: Timestamp::from_micros(raw.block_timestamp).with_relative(),
            from_address: raw.from_address,
            log_index: raw.log_index,
            to_address: raw.to_address,
            token_contract_address: raw.token_contract_address,
            token_contract_name: raw.token_contract_name,
            token_contract_symbol: raw.token_contract_symbol,
            transaction_fee: raw.transaction_fee,
            transaction_hash: raw.transaction_hash,
            value: raw.value,
            value_decimal: Formatted::number(value_decimal),
        }
    }
}

/// Address with its known name and kind, if any.
#[derive(Debug, Clone, Serialize)]
pub struct AddressField {
    pub default: Option<String>,
    pub formatted: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<AddressType>,
}

impl AddressField {
    pub fn new(address: Option<String>) -> Self {
        let address = address.filter(|a| !a.is_empty());
        Self {
            formatted: address.as_deref().and_then(addresses::get_address_name),
            kind: address.as_deref().and_then(addresses::get_address_type),
            default: address,
        }
    }

    /// Known name, else the address itself.
    pub fn label(&self) -> &str {
        self.formatted
            .as_deref()
            .or(self.default.as_deref())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackerTransaction {
    #[serde(deserialize_with = "flexible_i64")]
    pub block_number: i64,
    #[serde(deserialize_with = "flexible_i64")]
    pub block_timestamp: i64,
    #[serde(default)]
    pub data: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub from_address: Option<String>,
    pub hash: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub method: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub to_address: Option<String>,
    #[serde(default)]
    pub transaction_fee: String,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub transaction_type: i64,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    pub block_number: Formatted<i64>,
    pub block_timestamp: Timestamp,
    pub data: JsonData,
    pub from_address: AddressField,
    pub hash: String,
    pub method: Option<String>,
    pub status: String,
    pub to_address: AddressField,
    pub transaction_fee: Formatted<Decimal>,
    pub transaction_type: i64,
    pub value: Formatted<Decimal>,
}

impl Transaction {
    pub fn is_success(&self) -> bool {
        self.status == "0x1"
    }
}

impl From<TrackerTransaction> for Transaction {
    fn from(raw: TrackerTransaction) -> Self {
        Self {
            block_number: Formatted::count(raw.block_number),
            block_timestamp: Timestamp::from_micros(raw.block_timestamp).with_relative(),
            data: JsonData::parse(&raw.data, true),
            from_address: AddressField::new(raw.from_address),
            hash: raw.hash,
            method: raw.method,
            status: raw.status,
            to_address: AddressField::new(raw.to_address),
            transaction_fee: Formatted::number(scale_hex(&raw.transaction_fee, EXA)),
            transaction_type: raw.transaction_type,
            value: Formatted::number(scale_hex(&raw.value, EXA)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackerTransactionDetail {
    #[serde(default)]
    pub block_hash: String,
    #[serde(deserialize_with = "flexible_i64")]
    pub block_number: i64,
    #[serde(deserialize_with = "flexible_i64")]
    pub block_timestamp: i64,
    #[serde(default, deserialize_with = "flexible_i128")]
    pub cumulative_step_used: i128,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub data_type: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub from_address: Option<String>,
    pub hash: String,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub log_count: i64,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub method: Option<String>,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub nid: i64,
    #[serde(default, deserialize_with = "optional_i64")]
    pub nonce: Option<i64>,
    #[serde(default)]
    pub score_address: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub signature: Option<String>,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub status: i64,
    #[serde(default, deserialize_with = "flexible_i128")]
    pub step_limit: i128,
    #[serde(default, deserialize_with = "flexible_i128")]
    pub step_price: i128,
    #[serde(default, deserialize_with = "flexible_i128")]
    pub step_used: i128,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub timestamp: i64,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub to_address: Option<String>,
    #[serde(default, deserialize_with = "flexible_i128")]
    pub transaction_fee: i128,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub transaction_index: i64,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "flexible_i128")]
    pub value: i128,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub version: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionDetail {
    pub block_hash: String,
    pub block_number: Formatted<i64>,
    pub block_timestamp: Timestamp,
    pub confirmations: Formatted<i64>,
    pub cumulative_step_used: Formatted<Decimal>,
    pub data: JsonData,
    pub data_type: String,
    pub from_address: AddressField,
    pub hash: String,
    pub log_count: i64,
    pub method: Option<String>,
    pub nid: i64,
    pub nonce: Option<Formatted<i64>>,
    pub score_address: String,
    pub signature: Option<String>,
    pub status: i64,
    pub step_limit: Formatted<Decimal>,
    pub step_price: Formatted<Decimal>,
    pub step_used: Formatted<Decimal>,
    pub timestamp: Timestamp,
    pub to_address: AddressField,
    pub transaction_fee: Formatted<Decimal>,
    pub transaction_index: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: Formatted<Decimal>,
    pub version: i64,
}

impl TrackerTransactionDetail {
    /// Confirmations are counted against `latest_height`.
    pub fn into_view(self, latest_height: u64) -> TransactionDetail {
        let confirmations = (latest_height as i64 - self.block_number).max(0);
        TransactionDetail {
            block_hash: self.block_hash,
            block_number: Formatted::count(self.block_number),
            block_timestamp: Timestamp::from_micros(self.block_timestamp).with_relative(),
            confirmations: Formatted::count(confirmations),
            cumulative_step_used: Formatted::number(scale(self.cumulative_step_used, 0)),
            data: JsonData::parse(&self.data, true),
            data_type: self.data_type,
            from_address: AddressField::new(self.from_address),
            hash: self.hash,
            log_count: self.log_count,
            method: self.method,
            nid: self.nid,
            nonce: self.nonce.map(Formatted::count),
            score_address: self.score_address,
            signature: self.signature,
            status: self.status,
            step_limit: Formatted::number(scale(self.step_limit, 0)),
            step_price: Formatted::number(scale(self.step_price, EXA)),
            step_used: Formatted::number(scale(self.step_used, 0)),
            timestamp: Timestamp::from_micros(self.timestamp),
            to_address: AddressField::new(self.to_address),
            transaction_fee: Formatted::number(scale(self.transaction_fee, EXA)),
            transaction_index: self.transaction_index,
            kind: self.kind,
            value: Formatted::number(scale(self.value, EXA)),
            version: self.version,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionLog {
    pub address: String,
    pub block_number: Formatted<i64>,
    pub block_timestamp: Timestamp,
    pub data: JsonData,
    pub data_int: Option<Vec<Option<i128>>>,
    pub indexed: Vec<Value>,
    pub log_index: i64,
    pub method: String,
    pub tx_hash: String,
}

impl From<TrackerLog> for TransactionLog {
    fn from(raw: TrackerLog) -> Self {
        let data_int = match serde_json::from_str::<Value>(&raw.data) {
            Ok(Value::Array(items)) => Some(
                items
                    .iter()
                    .map(|item| item.as_str().and_then(crate::utils::to_int))
                    .collect(),
            ),
            _ => None,
        };
        Self {
            address: raw.address,
            block_number: Formatted::count(raw.block_number),
            block_timestamp: Timestamp::from_micros(raw.block_timestamp),
            data: JsonData::parse(&raw.data, false),
            data_int,
            indexed: decode_json_array(&raw.indexed),
            log_index: raw.log_index,
            method: raw.method,
            tx_hash: raw.transaction_hash,
        }
    }
}

/// Transaction cached in the `recent_transactions` table.
#[derive(Debug, Clone, Serialize)]
pub struct RecentTransaction {
    pub hash: String,
    pub block_timestamp: Timestamp,
    pub value: Formatted<Decimal>,
    pub method: Option<String>,
}

impl RecentTransaction {
    pub fn new(hash: String, block_timestamp_us: i64, value: &str, method: Option<String>) -> Self {
        Self {
            hash,
            block_timestamp: Timestamp::from_micros(block_timestamp_us).with_relative(),
            value: Formatted::number(scale_hex(value, EXA)),
            method: method.filter(|m| !m.is_empty()),
        }
    }
}

// ---------------------------------------------------------------------------
// Validators
// ---------------------------------------------------------------------------

/// One entry of `getPReps().preps`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawValidator {
    pub address: String,
    #[serde(default, deserialize_with = "flexible_i128")]
    pub bonded: i128,
    #[serde(default)]
    pub country: String,
    #[serde(default, deserialize_with = "flexible_i128")]
    pub delegated: i128,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub grade: i64,
    #[serde(default, deserialize_with = "flexible_i128")]
    pub irep: i128,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub irep_update_block_height: i64,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub last_height: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub node_address: String,
    #[serde(default)]
    pub p2p_endpoint: String,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub penalty: i64,
    #[serde(default, deserialize_with = "flexible_i128")]
    pub power: i128,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub status: i64,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub total_blocks: i64,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub validated_blocks: i64,
    #[serde(default)]
    pub website: String,
}

#[derive(Debug, Deserialize)]
pub struct PRepsResponse {
    #[serde(default)]
    pub preps: Vec<RawValidator>,
}

/// Network-wide inputs needed to derive validator rewards.
pub struct ValidatorContext<'a> {
    pub icx_usd_price: Decimal,
    pub network_info: &'a NetworkInfo,
    pub cps_validators: &'a HashSet<String>,
    pub node_statuses: &'a HashMap<String, bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Country {
    pub default: String,
    pub formatted: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Validator {
    pub rank: usize,
    pub address: String,
    pub bonded: Formatted<Decimal>,
    pub bonded_ratio: Formatted<Decimal>,
    pub country: Country,
    pub cps: bool,
    pub daily_reward: Formatted<Decimal>,
    pub daily_reward_usd: Formatted<Decimal>,
    pub delegated: Formatted<Decimal>,
    pub details: String,
    pub email: String,
    pub grade: Formatted<i64>,
    pub irep: Formatted<Decimal>,
    pub irep_update_block_height: Formatted<i64>,
    pub last_height: i64,
    pub monthly_reward: Formatted<Decimal>,
    pub monthly_reward_usd: Formatted<Decimal>,
    pub name: String,
    pub node_address: String,
    pub node_status: Option<bool>,
    pub p2p_endpoint: String,
    pub penalty: i64,
    pub power: Formatted<Decimal>,
    pub productivity: Formatted<Decimal>,
    pub status: i64,
    pub total_blocks: Formatted<i64>,
    pub validated_blocks: Formatted<i64>,
    pub website: String,
}

pub fn grade_name(grade: i64) -> &'static str {
    match grade {
        0 => "main",
        1 => "sub",
        _ => "candidate",
    }
}

/// Collapses operator names that carry a per-node suffix.
pub fn normalize_validator_name(name: &str) -> String {
    const PREFIXES: [&str; 4] = ["Gilga Capital", "ICONLEO", "ICXburners", "UNBLOCK"];
    PREFIXES
        .iter()
        .find(|prefix| name.starts_with(**prefix))
        .map(|prefix| prefix.to_string())
        .unwrap_or_else(|| name.to_string())
}

fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

impl Validator {
    pub fn new(rank: usize, raw: RawValidator, ctx: &ValidatorContext<'_>) -> Self {
        let bonded = scale(raw.bonded, EXA);
        let delegated = scale(raw.delegated, EXA);
        let power = scale(raw.power, EXA);

        let reward_fund = &ctx.network_info.reward_fund;
        let total_power = scale(ctx.network_info.total_power, EXA);
        let i_global = scale(reward_fund.i_global, EXA);
        let i_prep = scale(reward_fund.i_prep, 0) / Decimal::ONE_HUNDRED;

        let monthly_reward = ratio(power, total_power) * (i_global * i_prep);
        let daily_reward = monthly_reward * Decimal::from(12) / Decimal::from(365);

        Self {
            rank,
            bonded_ratio: Formatted::percentage(ratio(bonded, delegated)),
            productivity: Formatted::percentage(ratio(
                Decimal::from(raw.validated_blocks),
                Decimal::from(raw.total_blocks),
            )),
            bonded: Formatted::number(bonded),
            delegated: Formatted::number(delegated),
            power: Formatted::number(power),
            irep: Formatted::number(scale(raw.irep, EXA)),
            monthly_reward: Formatted::number(monthly_reward),
            daily_reward: Formatted::number(daily_reward),
            monthly_reward_usd: Formatted::number(monthly_reward * ctx.icx_usd_price),
            daily_reward_usd: Formatted::number(daily_reward * ctx.icx_usd_price),
            country: Country {
                formatted: convert_country_code_to_hex(&raw.country),
                default: raw.country,
            },
            cps: ctx.cps_validators.contains(&raw.address),
            node_status: ctx.node_statuses.get(&raw.address).copied(),
            grade: Formatted {
                default: raw.grade,
                formatted: grade_name(raw.grade).to_string(),
            },
            irep_update_block_height: Formatted::count(raw.irep_update_block_height),
            total_blocks: Formatted::count(raw.total_blocks),
            validated_blocks: Formatted::count(raw.validated_blocks),
            name: normalize_validator_name(&raw.name),
            address: raw.address,
            details: raw.details,
            email: raw.email,
            last_height: raw.last_height,
            node_address: raw.node_address,
            p2p_endpoint: raw.p2p_endpoint,
            penalty: raw.penalty,
            status: raw.status,
            website: raw.website,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidatorSort {
    Rank,
    Name,
    Cps,
    Delegation,
    Power,
    Bond,
    Productivity,
    Rewards,
}

impl FromStr for ValidatorSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rank" => Ok(Self::Rank),
            "name" => Ok(Self::Name),
            "cps" => Ok(Self::Cps),
            "delegation" => Ok(Self::Delegation),
            "power" => Ok(Self::Power),
            "bond" => Ok(Self::Bond),
            "productivity" => Ok(Self::Productivity),
            "rewards" => Ok(Self::Rewards),
            other => Err(format!("invalid sort key: {}", other)),
        }
    }
}

impl ValidatorSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rank => "rank",
            Self::Name => "name",
            Self::Cps => "cps",
            Self::Delegation => "delegation",
            Self::Power => "power",
            Self::Bond => "bond",
            Self::Productivity => "productivity",
            Self::Rewards => "rewards",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

pub fn sort_validators(validators: &mut [Validator], sort_by: ValidatorSort, dir: SortDirection) {
    match sort_by {
        ValidatorSort::Rank => validators.sort_by_key(|v| v.rank),
        ValidatorSort::Name => validators.sort_by(|a, b| a.name.cmp(&b.name)),
        ValidatorSort::Cps => validators.sort_by_key(|v| v.cps),
        ValidatorSort::Delegation => validators.sort_by_key(|v| v.delegated.default),
        ValidatorSort::Power => validators.sort_by_key(|v| v.power.default),
        ValidatorSort::Bond => validators.sort_by_key(|v| v.bonded_ratio.default),
        ValidatorSort::Productivity => validators.sort_by_key(|v| v.productivity.default),
        ValidatorSort::Rewards => validators.sort_by_key(|v| v.monthly_reward.default),
    }
    if dir == SortDirection::Desc {
        validators.reverse();
    }
}

/// Figures for the governance page's IISS summary.
#[derive(Debug, Clone, Serialize)]
pub struct IissOverview {
    pub bond_requirement: String,
    pub total_bonded_icx: String,
    pub total_delegated_icx: String,
    pub total_staked_icx: String,
    pub total_power: String,
    pub staking_apy: String,
    pub i_global: String,
    pub i_cps: i128,
    pub i_prep: i128,
    pub i_relay: i128,
    pub i_voter: i128,
    pub validator_count: i64,
    pub main_validator_count: i64,
    pub sub_validator_count: i64,
    pub average_bond: String,
}

impl IissOverview {
    pub fn new(network_info: &NetworkInfo, validators: &[RawValidator]) -> Self {
        use crate::utils::{format_number, format_percentage};

        let main_validator_count = network_info.main_prep_count + network_info.extra_main_prep_count;
        let bonds: Vec<Decimal> = validators
            .iter()
            .map(|v| scale(v.bonded, EXA))
            .filter(|b| *b > Decimal::ZERO)
            .collect();
        let average_bond = if bonds.is_empty() {
            Decimal::ZERO
        } else {
            bonds.iter().sum::<Decimal>() / Decimal::from(bonds.len())
        };
        let reward_fund = &network_info.reward_fund;
        let supply = network_info.staked_delegated_supply();

        Self {
            bond_requirement: format_percentage(
                Decimal::from(network_info.bond_requirement) / Decimal::from(100),
                2,
                false,
            ),
            total_bonded_icx: format_number(scale(network_info.total_bonded, EXA), 0, false),
            total_delegated_icx: format_number(supply.delegated_supply, 0, false),
            total_staked_icx: format_number(supply.staked_supply, 0, false),
            total_power: format_number(scale(network_info.total_power, EXA), 0, false),
            staking_apy: format_percentage(network_info.staking_apy(), 2, false),
            i_global: format_number(scale(reward_fund.i_global, EXA), 0, false),
            i_cps: reward_fund.i_cps,
            i_prep: reward_fund.i_prep,
            i_relay: reward_fund.i_relay,
            i_voter: reward_fund.i_voter,
            validator_count: network_info.preps,
            main_validator_count,
            sub_validator_count: network_info.preps - main_validator_count,
            average_bond: format_number(average_bond, 0, false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn network_info() -> NetworkInfo {
        serde_json::from_value(serde_json::json!({
            "preps": "0x64",
            "mainPRepCount": "0x16",
            "extraMainPRepCount": "0x3",
            "bondRequirement": "0x5",
            "rewardFund": {
                "Iglobal": "0x3635c9adc5dea00000",
                "Iprep": "0x32",
                "Icps": "0xa",
                "Irelay": "0x0",
                "Ivoter": "0x28"
            },
            "totalBonded": "0x0",
            "totalDelegated": "0x3635c9adc5dea00000",
            "totalStake": "0x3635c9adc5dea00000",
            "totalPower": "0x3635c9adc5dea00000"
        }))
        .unwrap()
    }

    fn raw_validator(name: &str, power_icx: i128) -> RawValidator {
        serde_json::from_value(serde_json::json!({
            "address": format!("hx{}", "a".repeat(40)),
            "bonded": format!("0x{:x}", 10 * 10i128.pow(18)),
            "country": "USA",
            "delegated": format!("0x{:x}", 100 * 10i128.pow(18)),
            "grade": "0x0",
            "name": name,
            "nodeAddress": format!("hx{}", "b".repeat(40)),
            "power": format!("0x{:x}", power_icx * 10i128.pow(18)),
            "totalBlocks": "0x4",
            "validatedBlocks": "0x3"
        }))
        .unwrap()
    }

    #[test]
    fn test_network_info_decodes_hex() {
        let info = network_info();
        assert_eq!(info.preps, 100);
        assert_eq!(info.main_prep_count, 22);
        assert_eq!(info.reward_fund.i_global, 1000 * 10i128.pow(18));
        assert_eq!(info.staked_delegated_supply().staked_supply, dec!(1000));
    }

    #[test]
    fn test_staking_apy() {
        // 1000 * 0.4 * 12 / 1000
        assert_eq!(network_info().staking_apy(), dec!(4.8));
        assert_eq!(NetworkInfo::default().staking_apy(), Decimal::ZERO);
    }

    #[test]
    fn test_validator_rewards() {
        let info = network_info();
        let cps = HashSet::from([format!("hx{}", "a".repeat(40))]);
        let statuses = HashMap::new();
        let ctx = ValidatorContext {
            icx_usd_price: dec!(0.5),
            network_info: &info,
            cps_validators: &cps,
            node_statuses: &statuses,
        };
        let validator = Validator::new(1, raw_validator("Gilga Capital 2", 100), &ctx);

        // 100 / 1000 * (1000 * 0.5)
        assert_eq!(validator.monthly_reward.default, dec!(50));
        assert_eq!(validator.daily_reward.default, dec!(50) * dec!(12) / dec!(365));
        assert_eq!(validator.monthly_reward_usd.default, dec!(25));
        assert_eq!(validator.bonded_ratio.default, dec!(0.1));
        assert_eq!(validator.productivity.default, dec!(0.75));
        assert_eq!(validator.productivity.formatted, "75.00%");
        assert_eq!(validator.grade.formatted, "main");
        assert_eq!(validator.name, "Gilga Capital");
        assert!(validator.cps);
        assert_eq!(validator.node_status, None);
        assert_eq!(validator.country.formatted, "&#127482;&#127480;");
    }

    #[test]
    fn test_grade_and_names() {
        assert_eq!(grade_name(1), "sub");
        assert_eq!(grade_name(2), "candidate");
        assert_eq!(normalize_validator_name("ICONLEO-1"), "ICONLEO");
        assert_eq!(normalize_validator_name("UNBLOCK node"), "UNBLOCK");
        assert_eq!(normalize_validator_name("RHIZOME"), "RHIZOME");
    }

    #[test]
    fn test_sort_validators() {
        let info = network_info();
        let empty_set = HashSet::new();
        let statuses = HashMap::new();
        let ctx = ValidatorContext {
            icx_usd_price: Decimal::ONE,
            network_info: &info,
            cps_validators: &empty_set,
            node_statuses: &statuses,
        };
        let mut validators = vec![
            Validator::new(1, raw_validator("Bravo", 300), &ctx),
            Validator::new(2, raw_validator("Alpha", 100), &ctx),
            Validator::new(3, raw_validator("Charlie", 200), &ctx),
        ];

        sort_validators(&mut validators, ValidatorSort::Name, SortDirection::Asc);
        assert_eq!(validators[0].name, "Alpha");

        sort_validators(&mut validators, ValidatorSort::Power, SortDirection::Desc);
        assert_eq!(validators[0].name, "Bravo");
        assert_eq!(validators[2].name, "Alpha");

        sort_validators(&mut validators, ValidatorSort::Rank, SortDirection::Asc);
        assert_eq!(validators[0].rank, 1);

        assert_eq!("rewards".parse::<ValidatorSort>(), Ok(ValidatorSort::Rewards));
        assert!("id".parse::<ValidatorSort>().is_err());
    }

    #[test]
    fn test_iiss_overview() {
        let validators = vec![raw_validator("A", 1), raw_validator("B", 1)];
        let overview = IissOverview::new(&network_info(), &validators);
        assert_eq!(overview.main_validator_count, 25);
        assert_eq!(overview.sub_validator_count, 75);
        assert_eq!(overview.bond_requirement, "5.00%");
        assert_eq!(overview.average_bond, "10");
        assert_eq!(overview.i_global, "1,000");
    }

    #[test]
    fn test_transaction_from_tracker() {
        let raw: TrackerTransaction = serde_json::from_value(serde_json::json!({
            "block_number": 100,
            "block_timestamp": 1_650_000_000_000_000i64,
            "data": "",
            "from_address": format!("hx{}", "1".repeat(40)),
            "hash": format!("0x{}", "2".repeat(64)),
            "method": "",
            "status": "0x1",
            "to_address": crate::config::balanced::LOANS_CONTRACT,
            "transaction_fee": "0xde0b6b3a7640000",
            "transaction_type": 0,
            "value": ""
        }))
        .unwrap();
        let tx = Transaction::from(raw);
        assert!(tx.is_success());
        assert_eq!(tx.method, None);
        assert_eq!(tx.value.default, Decimal::ZERO);
        assert_eq!(tx.transaction_fee.default, dec!(1));
        assert_eq!(tx.to_address.label(), "Balanced Loans");
        assert_eq!(tx.to_address.kind, Some(AddressType::Contract));
        assert!(tx.data.default.is_none());
    }

    #[test]
    fn test_transaction_log_data_int() {
        let raw: TrackerLog = serde_json::from_value(serde_json::json!({
            "address": "cx00",
            "block_number": 1,
            "block_timestamp": 1_000_000,
            "data": "[\"0x10\", null]",
            "indexed": "[\"Liquidate(Address,int,bytes)\", \"hx01\", \"0xde0b6b3a7640000\"]",
            "log_index": 2,
            "method": "Liquidate",
            "transaction_hash": "0xabc"
        }))
        .unwrap();
        let log = Log::from(raw.clone());
        assert_eq!(log.indexed_str(1), Some("hx01"));
        assert_eq!(log.indexed_int(2), Some(10i128.pow(18)));

        let tx_log = TransactionLog::from(raw);
        assert_eq!(tx_log.data_int, Some(vec![Some(16), None]));
        assert_eq!(tx_log.tx_hash, "0xabc");
    }

    #[test]
    fn test_transaction_detail_confirmations() {
        let raw: TrackerTransactionDetail = serde_json::from_value(serde_json::json!({
            "block_number": 90,
            "block_timestamp": 1_000_000,
            "hash": "0xabc",
            "step_price": "0x2e90edd00",
            "transaction_fee": "0xde0b6b3a7640000",
            "value": "0x0",
            "nonce": ""
        }))
        .unwrap();
        let detail = raw.into_view(100);
        assert_eq!(detail.confirmations.default, 10);
        assert_eq!(detail.transaction_fee.default, dec!(1));
        assert_eq!(detail.step_price.default, dec!(0.0000000125));
        assert!(detail.nonce.is_none());
    }
}
