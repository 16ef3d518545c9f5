//! Balanced DEX pools, loan positions and liquidations.

use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{EXA, balanced};
use crate::entities::{balanced_loans, icx_sicx_bnusd_quotes};
use crate::error::{AppError, AppResult};
use crate::models::de::flexible_i128;
use crate::models::formatted::{Formatted, Timestamp};
use crate::models::icx::{Log, SortDirection, TransactionDetail, TransactionLog};
use crate::utils::{format_number, format_percentage, micros_to_datetime, parse_number, scale};

/// Display metadata for one side of a pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub symbol: String,
    pub name: String,
    pub decimals: u32,
}

impl TokenInfo {
    pub fn icx() -> Self {
        Self {
            symbol: "ICX".to_string(),
            name: "ICX".to_string(),
            decimals: EXA,
        }
    }
}

/// `getPoolStats` result, hex values decoded.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPoolStats {
    #[serde(default)]
    pub base_token: Option<String>,
    #[serde(default)]
    pub quote_token: Option<String>,
    #[serde(default, deserialize_with = "flexible_i128")]
    pub base: i128,
    #[serde(default, deserialize_with = "flexible_i128")]
    pub quote: i128,
    #[serde(default, deserialize_with = "flexible_i128")]
    pub base_decimals: i128,
    #[serde(default, deserialize_with = "flexible_i128")]
    pub quote_decimals: i128,
    #[serde(default, deserialize_with = "flexible_i128")]
    pub min_quote: i128,
    #[serde(default, deserialize_with = "flexible_i128")]
    pub price: i128,
    #[serde(default, deserialize_with = "flexible_i128")]
    pub total_supply: i128,
}

#[derive(Debug, Clone, Serialize)]
pub struct Pool {
    pub id: u32,
    pub base_token: Option<String>,
    pub quote_token: Option<String>,
    pub base_decimals: u32,
    pub quote_decimals: u32,
    pub precision: u32,
    pub base: Decimal,
    pub quote: Decimal,
    pub min_quote: Decimal,
    pub price: Decimal,
    pub total_supply: Decimal,
    pub base_name: String,
    pub quote_name: String,
    pub base_symbol: String,
    pub quote_symbol: String,
    pub pool_name: String,
    pub price_daily_change_amount: Decimal,
    pub price_daily_change_percent: Decimal,
}

impl Pool {
    pub fn from_stats(id: u32, raw: RawPoolStats, base: &TokenInfo, quote: &TokenInfo) -> Self {
        let base_decimals = raw.base_decimals.max(0) as u32;
        let quote_decimals = raw.quote_decimals.max(0) as u32;
        let precision = (quote_decimals as i64 - base_decimals as i64 + EXA as i64).max(0) as u32;

        Self {
            id,
            base_token: raw.base_token,
            quote_token: raw.quote_token,
            base_decimals,
            quote_decimals,
            precision,
            base: scale(raw.base, base_decimals),
            quote: scale(raw.quote, quote_decimals),
            min_quote: scale(raw.min_quote, quote_decimals),
            price: scale(raw.price, precision),
            total_supply: scale(raw.total_supply, quote_decimals),
            base_name: base.name.clone(),
            quote_name: quote.name.clone(),
            base_symbol: base.symbol.clone(),
            quote_symbol: quote.symbol.clone(),
            pool_name: format!("{}/{}", base.symbol, quote.symbol),
            price_daily_change_amount: Decimal::ZERO,
            price_daily_change_percent: Decimal::ZERO,
        }
    }

    /// Sets the 24h price change against the same pool one day earlier.
    /// sICX/ICX (pool 1), pools missing a day ago and changes outside the
    /// `Decimal` range report no change.
    pub fn apply_daily_change(&mut self, previous: Option<&Pool>) {
        let previous_price = match previous {
            Some(prev) if self.id != 1 && !prev.price.is_zero() => prev.price,
            _ => {
                self.price_daily_change_amount = Decimal::ZERO;
                self.price_daily_change_percent = Decimal::ZERO;
                return;
            }
        };
        let change = self.price.checked_sub(previous_price).and_then(|amount| {
            amount
                .checked_div(previous_price)
                .map(|percent| (amount, percent))
        });
        let (amount, percent) = change.unwrap_or((Decimal::ZERO, Decimal::ZERO));
        self.price_daily_change_amount = amount;
        self.price_daily_change_percent = percent;
    }

    pub fn static_data(&self) -> PoolStaticData {
        PoolStaticData {
            id: self.id,
            base_decimals: self.base_decimals,
            base_name: self.base_name.clone(),
            base_token: self.base_token.clone(),
            base_symbol: self.base_symbol.clone(),
            min_quote: self.min_quote,
            pool_name: self.pool_name.clone(),
            quote_decimals: self.quote_decimals,
            quote_name: self.quote_name.clone(),
            quote_token: self.quote_token.clone(),
            quote_symbol: self.quote_symbol.clone(),
        }
    }

    pub fn dynamic_data(&self) -> PoolDynamicData {
        PoolDynamicData {
            id: self.id,
            base: self.base,
            price: self.price,
            price_daily_change_amount: self.price_daily_change_amount,
            price_daily_change_percent: self.price_daily_change_percent,
            quote: self.quote,
            total_supply: self.total_supply,
        }
    }

    pub fn is_featured(&self) -> bool {
        balanced::FEATURED_POOL_IDS.contains(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolStaticData {
    pub id: u32,
    pub base_decimals: u32,
    pub base_name: String,
    pub base_token: Option<String>,
    pub base_symbol: String,
    pub min_quote: Decimal,
    pub pool_name: String,
    pub quote_decimals: u32,
    pub quote_name: String,
    pub quote_token: Option<String>,
    pub quote_symbol: String,
}

/// One pool inside a minute-keyed snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolDynamicData {
    pub id: u32,
    pub base: Decimal,
    pub price: Decimal,
    pub price_daily_change_amount: Decimal,
    pub price_daily_change_percent: Decimal,
    pub quote: Decimal,
    pub total_supply: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct PoolView {
    pub id: u32,
    pub pool_name: String,
    pub base_symbol: String,
    pub quote_symbol: String,
    pub base: Formatted<Decimal>,
    pub quote: Formatted<Decimal>,
    pub price: Formatted<Decimal>,
    pub total_supply: Formatted<Decimal>,
    pub price_daily_change_amount: Formatted<Decimal>,
    pub price_daily_change_percent: Formatted<Decimal>,
}

impl From<&Pool> for PoolView {
    fn from(pool: &Pool) -> Self {
        Self {
            id: pool.id,
            pool_name: pool.pool_name.clone(),
            base_symbol: pool.base_symbol.clone(),
            quote_symbol: pool.quote_symbol.clone(),
            base: Formatted::number(pool.base),
            quote: Formatted::number(pool.quote),
            price: Formatted::number(pool.price),
            total_supply: Formatted::number(pool.total_supply),
            price_daily_change_amount: Formatted::number_with(
                pool.price_daily_change_amount,
                4,
                true,
            ),
            price_daily_change_percent: Formatted::percentage_with(
                pool.price_daily_change_percent,
                true,
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Loans
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanAssets {
    pub sicx: Decimal,
    pub bnusd: Decimal,
}

/// A loan position from `getAccountPositions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalancedLoan {
    pub pos_id: i64,
    pub address: String,
    pub created: NaiveDateTime,
    pub assets: LoanAssets,
    pub collateral: Decimal,
    pub ratio: Decimal,
    pub total_debt: Decimal,
    pub standing: String,
    pub holdings: Value,
    pub standings: Value,
}

fn hex_field(value: &Value, key: &str) -> Option<i128> {
    match value.get(key)? {
        Value::String(s) => parse_number(s),
        Value::Number(n) => n.as_i64().map(i128::from),
        _ => None,
    }
}

fn scaled_field(value: &Value, key: &str) -> Decimal {
    hex_field(value, key)
        .map(|v| scale(v, EXA))
        .unwrap_or_default()
}

impl BalancedLoan {
    pub fn from_position(value: &Value) -> AppResult<Self> {
        let pos_id = hex_field(value, "pos_id")
            .ok_or_else(|| AppError::Decode("loan position: missing pos_id".to_string()))?;
        let address = value
            .get("address")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::Decode("loan position: missing address".to_string()))?;
        let created = hex_field(value, "created").unwrap_or_default() as i64;

        let assets = value.get("assets").cloned().unwrap_or(Value::Null);
        let standing = value
            .get("standing")
            .and_then(Value::as_str)
            .or_else(|| value["standings"]["sICX"]["standing"].as_str())
            .unwrap_or_default();

        Ok(Self {
            pos_id: pos_id as i64,
            address: address.to_string(),
            created: micros_to_datetime(created),
            assets: LoanAssets {
                sicx: scaled_field(&assets, "sICX"),
                bnusd: scaled_field(&assets, "bnUSD"),
            },
            collateral: scaled_field(value, "collateral"),
            ratio: scaled_field(value, "ratio"),
            total_debt: scaled_field(value, "total_debt"),
            standing: standing.to_string(),
            holdings: value.get("holdings").cloned().unwrap_or(Value::Null),
            standings: value.get("standings").cloned().unwrap_or(Value::Null),
        })
    }
}

impl From<balanced_loans::Model> for BalancedLoan {
    fn from(model: balanced_loans::Model) -> Self {
        Self {
            pos_id: model.pos_id,
            address: model.address,
            created: model.created,
            assets: serde_json::from_value(model.assets).unwrap_or_default(),
            collateral: model.collateral,
            ratio: model.ratio,
            total_debt: model.total_debt,
            standing: model.standing,
            holdings: model.holdings,
            standings: model.standings,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanSort {
    Id,
    Ratio,
    Collateral,
    Debt,
    Date,
    Status,
}

impl FromStr for LoanSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(Self::Id),
            "ratio" => Ok(Self::Ratio),
            "collateral" => Ok(Self::Collateral),
            "debt" => Ok(Self::Debt),
            "date" => Ok(Self::Date),
            "status" => Ok(Self::Status),
            other => Err(format!("invalid sort key: {}", other)),
        }
    }
}

impl LoanSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Ratio => "ratio",
            Self::Collateral => "collateral",
            Self::Debt => "debt",
            Self::Date => "date",
            Self::Status => "status",
        }
    }
}

pub fn sort_loans(loans: &mut [BalancedLoan], sort_by: LoanSort, dir: SortDirection) {
    match sort_by {
        LoanSort::Id => loans.sort_by_key(|l| l.pos_id),
        LoanSort::Ratio => loans.sort_by_key(|l| l.ratio),
        LoanSort::Collateral => loans.sort_by_key(|l| l.collateral),
        LoanSort::Debt => loans.sort_by_key(|l| l.total_debt),
        LoanSort::Date => loans.sort_by_key(|l| l.created),
        LoanSort::Status => loans.sort_by(|a, b| a.standing.cmp(&b.standing)),
    }
    if dir == SortDirection::Desc {
        loans.reverse();
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoanView {
    pub id: Formatted<i64>,
    pub address: String,
    pub created: NaiveDateTime,
    pub collateral: Formatted<Decimal>,
    pub ratio: Formatted<Decimal>,
    pub total_debt: Formatted<Decimal>,
    pub standing: String,
}

impl From<&BalancedLoan> for LoanView {
    fn from(loan: &BalancedLoan) -> Self {
        Self {
            id: Formatted::count(loan.pos_id),
            address: loan.address.clone(),
            created: loan.created,
            collateral: Formatted::number(loan.collateral),
            ratio: Formatted::percentage(loan.ratio),
            total_debt: Formatted::number(loan.total_debt),
            standing: loan.standing.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoansOverview {
    pub loan_count: String,
    pub total_collateral: String,
    pub total_debt: String,
    pub mean_ratio: String,
    pub max_ratio: String,
}

impl LoansOverview {
    pub fn new(ratios: &[Decimal], total_collateral: Decimal, total_debt: Decimal) -> Self {
        let mean = if ratios.is_empty() {
            Decimal::ZERO
        } else {
            ratios.iter().sum::<Decimal>() / Decimal::from(ratios.len())
        };
        let max = ratios.iter().copied().max().unwrap_or_default();
        Self {
            loan_count: format_number(Decimal::from(ratios.len()), 4, false),
            total_collateral: format_number(total_collateral, 0, false),
            total_debt: format_number(total_debt, 0, false),
            mean_ratio: format_percentage(mean, 2, false),
            max_ratio: format_percentage(max, 2, false),
        }
    }
}

// ---------------------------------------------------------------------------
// Liquidations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Liquidation {
    pub address: String,
    pub amount: Formatted<Decimal>,
    pub block_number: i64,
    pub block_timestamp: Timestamp,
    pub log_index: i64,
    pub method: String,
    pub transaction_hash: String,
}

impl From<Log> for Liquidation {
    fn from(log: Log) -> Self {
        let amount = log.indexed_int(2).map(|v| scale(v, EXA)).unwrap_or_default();
        Self {
            address: log.indexed_str(1).unwrap_or_default().to_string(),
            amount: Formatted::number(amount),
            block_number: log.block_number,
            block_timestamp: log.block_timestamp,
            log_index: log.log_index,
            method: log.method,
            transaction_hash: log.transaction_hash,
        }
    }
}

/// Plain-language summary of a `liquidate` call on the loans contract.
pub fn liquidation_summary(
    transaction: &TransactionDetail,
    logs: &[TransactionLog],
) -> Option<String> {
    if transaction.to_address.default.as_deref() != Some(balanced::LOANS_CONTRACT)
        || transaction.method.as_deref() != Some("liquidate")
    {
        return None;
    }

    let liquidator = transaction.from_address.default.as_deref().unwrap_or_default();
    let owner = transaction
        .data
        .default
        .as_ref()
        .and_then(|d| d["params"]["_owner"].as_str())
        .unwrap_or_default();
    let intro = format!(
        "This transaction was sent by {} to liquidate a Balanced loan position owned by {}.",
        liquidator, owner
    );

    if transaction.log_count == 0 {
        return Some(format!(
            "{} The liquidation was unsuccessful because the transaction was too slow.",
            intro
        ));
    }

    let liquidation_log = logs
        .iter()
        .find(|log| log.method == "Liquidate")
        .or_else(|| logs.get(3));
    let amount = liquidation_log
        .and_then(|log| log.indexed.get(2))
        .and_then(Value::as_str)
        .and_then(parse_number)
        .map(|v| scale(v, EXA))
        .unwrap_or_default();

    Some(format!(
        "{} The liquidation was successful, and resulted in the position owner losing {} sICX.",
        intro,
        format_number(amount, 4, false)
    ))
}

// ---------------------------------------------------------------------------
// Quotes
// ---------------------------------------------------------------------------

/// One point of the bnUSD/USD chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub x: String,
    pub y: Decimal,
}

/// bnUSD priced in USD through sICX: ICX/USD × sICX/ICX ÷ sICX/bnUSD.
pub fn bnusd_usd_price(quote: &icx_sicx_bnusd_quotes::Model) -> Option<Decimal> {
    if quote.sicx_bnusd.is_zero() {
        return None;
    }
    Some((quote.icx_usd * quote.sicx_icx / quote.sicx_bnusd).round_dp(6))
}

pub fn bnusd_price_points(quotes: &[icx_sicx_bnusd_quotes::Model]) -> Vec<PricePoint> {
    quotes
        .iter()
        .filter_map(|quote| {
            bnusd_usd_price(quote).map(|y| PricePoint {
                x: quote.timestamp.format("%Y-%m-%dT%H:%M").to_string(),
                y,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::icx::{TrackerLog, TrackerTransactionDetail};
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn bnusd() -> TokenInfo {
        TokenInfo {
            symbol: "bnUSD".to_string(),
            name: "Balanced Dollar".to_string(),
            decimals: 18,
        }
    }

    fn pool(id: u32, price_hex: &str) -> Pool {
        let raw: RawPoolStats = serde_json::from_value(json!({
            "base_token": "cx2609b924e33ef00b648a409245c7ea394c467824",
            "quote_token": "cx88fd7df7ddff82f7cc735c871dc519838cb235bb",
            "base": "0xde0b6b3a7640000",
            "quote": "0x1bc16d674ec80000",
            "base_decimals": "0x12",
            "quote_decimals": "0x12",
            "min_quote": "0x0",
            "price": price_hex,
            "total_supply": "0xde0b6b3a7640000"
        }))
        .unwrap();
        let sicx = TokenInfo {
            symbol: "sICX".to_string(),
            name: "Staked ICX".to_string(),
            decimals: 18,
        };
        Pool::from_stats(id, raw, &sicx, &bnusd())
    }

    #[test]
    fn test_pool_from_stats() {
        let pool = pool(2, "0x1bc16d674ec80000");
        assert_eq!(pool.precision, 18);
        assert_eq!(pool.base, dec!(1));
        assert_eq!(pool.quote, dec!(2));
        assert_eq!(pool.price, dec!(2));
        assert_eq!(pool.pool_name, "sICX/bnUSD");
        assert!(pool.is_featured());
    }

    #[test]
    fn test_precision_for_mixed_decimals() {
        let raw: RawPoolStats = serde_json::from_value(json!({
            "base_decimals": "0x12",
            "quote_decimals": "0x6",
            "price": "0xf4240",
            "quote": "0xf4240"
        }))
        .unwrap();
        let usdc = TokenInfo {
            symbol: "IUSDC".to_string(),
            name: "ICON USD Coin".to_string(),
            decimals: 6,
        };
        let pool = Pool::from_stats(5, raw, &TokenInfo::icx(), &usdc);
        assert_eq!(pool.precision, 6);
        assert_eq!(pool.price, dec!(1));
        assert_eq!(pool.quote, dec!(1));
        assert_eq!(pool.pool_name, "ICX/IUSDC");
    }

    #[test]
    fn test_daily_change() {
        let mut current = pool(2, "0x1bc16d674ec80000"); // 2.0
        let previous = pool(2, "0xde0b6b3a7640000"); // 1.0
        current.apply_daily_change(Some(&previous));
        assert_eq!(current.price_daily_change_amount, dec!(1));
        assert_eq!(current.price_daily_change_percent, dec!(1));

        current.apply_daily_change(None);
        assert_eq!(current.price_daily_change_amount, Decimal::ZERO);

        let mut sicx_icx = pool(1, "0x1bc16d674ec80000");
        sicx_icx.apply_daily_change(Some(&previous));
        assert_eq!(sicx_icx.price_daily_change_percent, Decimal::ZERO);

        let view = PoolView::from(&pool(3, "0x1bc16d674ec80000"));
        assert_eq!(view.price_daily_change_percent.formatted, "±0%");
    }

    #[test]
    fn test_daily_change_out_of_range_reports_no_change() {
        let mut current = pool(2, "0x1bc16d674ec80000");
        current.price = Decimal::MAX;
        let mut previous = pool(2, "0xde0b6b3a7640000");
        previous.price = Decimal::new(1, 28);
        current.apply_daily_change(Some(&previous));
        assert_eq!(current.price_daily_change_amount, Decimal::ZERO);
        assert_eq!(current.price_daily_change_percent, Decimal::ZERO);
    }

    #[test]
    fn test_loan_from_position() {
        let position = json!({
            "pos_id": "0x7",
            "created": "0x5a0b3c8b0c8c0",
            "address": "hx0000000000000000000000000000000000000001",
            "assets": { "sICX": "0x1bc16d674ec80000", "bnUSD": "0xde0b6b3a7640000" },
            "collateral": "0x1bc16d674ec80000",
            "ratio": "0x30927f74c9de0000",
            "total_debt": "0xde0b6b3a7640000",
            "standing": "Mining",
            "holdings": { "sICX": { "sICX": "0x1", "bnUSD": "0x0" } },
            "standings": {}
        });
        let loan = BalancedLoan::from_position(&position).unwrap();
        assert_eq!(loan.pos_id, 7);
        assert_eq!(loan.assets.sicx, dec!(2));
        assert_eq!(loan.ratio, dec!(3.5));
        assert_eq!(loan.standing, "Mining");
        assert_eq!(LoanView::from(&loan).ratio.formatted, "350.00%");

        assert!(BalancedLoan::from_position(&json!({ "address": "hx01" })).is_err());
    }

    #[test]
    fn test_sort_loans_and_overview() {
        let make = |id: i64, ratio: Decimal| BalancedLoan {
            pos_id: id,
            address: format!("hx{}", id),
            created: micros_to_datetime(id),
            assets: LoanAssets::default(),
            collateral: Decimal::from(id),
            ratio,
            total_debt: Decimal::ZERO,
            standing: String::new(),
            holdings: Value::Null,
            standings: Value::Null,
        };
        let mut loans = vec![make(1, dec!(3)), make(2, dec!(1.5)), make(3, dec!(6))];
        sort_loans(&mut loans, LoanSort::Ratio, SortDirection::Desc);
        assert_eq!(loans[0].pos_id, 3);
        assert_eq!(loans[2].pos_id, 2);

        let overview = LoansOverview::new(&[dec!(3), dec!(1.5), dec!(6)], dec!(1234.9), dec!(2500000.5));
        assert_eq!(overview.loan_count, "3");
        assert_eq!(overview.mean_ratio, "350.00%");
        assert_eq!(overview.max_ratio, "600.00%");
        assert_eq!(overview.total_collateral, "1,234");
        assert_eq!(overview.total_debt, "2,500,000");
    }

    #[test]
    fn test_liquidation_from_log() {
        let raw: TrackerLog = serde_json::from_value(json!({
            "address": balanced::LOANS_CONTRACT,
            "block_number": 1,
            "block_timestamp": 1_000_000,
            "data": "[]",
            "indexed": "[\"Liquidate(Address,int,bytes)\", \"hx01\", \"0x29a2241af62c0000\"]",
            "log_index": 0,
            "method": "Liquidate",
            "transaction_hash": "0x01"
        }))
        .unwrap();
        let liquidation = Liquidation::from(Log::from(raw));
        assert_eq!(liquidation.address, "hx01");
        assert_eq!(liquidation.amount.default, dec!(3));
    }

    #[test]
    fn test_bnusd_price_points() {
        let quote = |minute: u32, sicx_bnusd: Decimal| icx_sicx_bnusd_quotes::Model {
            timestamp: chrono::NaiveDate::from_ymd_opt(2022, 6, 1)
                .unwrap()
                .and_hms_opt(12, minute, 0)
                .unwrap(),
            icx_usd: dec!(0.5),
            sicx_bnusd,
            sicx_icx: dec!(1.1),
        };
        let points = bnusd_price_points(&[quote(0, dec!(0.55)), quote(1, Decimal::ZERO)]);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].x, "2022-06-01T12:00");
        assert_eq!(points[0].y, dec!(1));
    }

    #[test]
    fn test_loan_from_stored_row() {
        let model = balanced_loans::Model {
            pos_id: 7,
            address: "hx0000000000000000000000000000000000000007".to_string(),
            created: micros_to_datetime(1_640_995_200_000_000),
            collateral: dec!(1000),
            ratio: dec!(3.5),
            total_debt: dec!(250.5),
            standing: "Mining".to_string(),
            assets: json!({ "sicx": "1000", "bnusd": "250.5" }),
            holdings: Value::Null,
            standings: Value::Null,
            updated_at: micros_to_datetime(1_640_995_200_000_000),
        };
        let loan = BalancedLoan::from(model);
        assert_eq!(loan.assets.sicx, dec!(1000));
        assert_eq!(loan.assets.bnusd, dec!(250.5));
        assert_eq!(loan.standing, "Mining");
    }

    #[test]
    fn test_liquidation_summary() {
        let detail = |log_count: i64| {
            let raw: TrackerTransactionDetail = serde_json::from_value(json!({
                "block_number": 1,
                "block_timestamp": 1,
                "hash": "0x01",
                "from_address": "hxliquidator",
                "to_address": balanced::LOANS_CONTRACT,
                "method": "liquidate",
                "log_count": log_count,
                "data": "{\"method\": \"liquidate\", \"params\": {\"_owner\": \"hxowner\"}}"
            }))
            .unwrap();
            raw.into_view(1)
        };

        let slow = liquidation_summary(&detail(0), &[]).unwrap();
        assert!(slow.contains("hxliquidator"));
        assert!(slow.contains("hxowner"));
        assert!(slow.ends_with("too slow."));

        let raw_log: TrackerLog = serde_json::from_value(json!({
            "address": balanced::LOANS_CONTRACT,
            "block_number": 1,
            "block_timestamp": 1,
            "data": "[]",
            "indexed": "[\"Liquidate(Address,int,bytes)\", \"hxowner\", \"0x29a2241af62c0000\"]",
            "log_index": 3,
            "method": "Liquidate",
            "transaction_hash": "0x01"
        }))
        .unwrap();
        let logs = vec![TransactionLog::from(raw_log)];
        let success = liquidation_summary(&detail(4), &logs).unwrap();
        assert!(success.ends_with("losing 3 sICX."));
    }
}
