//! Create-or-replace snapshots of upstream data into Postgres.
//!
//! Every write is keyed on the upstream identity (block height, tx hash,
//! position id, pool id, minute) so re-running a sync replaces rows instead
//! of duplicating them.

use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::config::GENESIS_TIMESTAMP_S;
use crate::entities::{
    balanced_loans, balanced_pool_dynamic_snapshots, balanced_pool_static_data,
    icx_sicx_bnusd_quotes, recent_blocks, recent_transactions, validator_node_statuses,
};
use crate::error::{AppError, AppResult};
use crate::models::balanced::{BalancedLoan, PoolDynamicData, PoolStaticData};
use crate::models::icx::{TrackerBlock, TrackerTransaction};
use crate::services::balanced::BalancedService;
use crate::services::gov::GovService;
use crate::services::icx::IcxService;
use crate::services::tracker::{TrackerService, TransactionFilter};
use crate::utils::{TimePrecision, get_datetime_in_utc};

/// Rows per INSERT statement; keeps large loan books under the bind limit.
const INSERT_CHUNK: usize = 500;

pub const SICX_BNUSD_POOL: &str = "sICX/bnUSD";
pub const SICX_ICX_POOL: &str = "sICX/ICX";

fn recent_block_model(block: TrackerBlock) -> recent_blocks::ActiveModel {
    recent_blocks::ActiveModel {
        number: Set(block.number),
        hash: Set(block.hash),
        timestamp: Set(block.timestamp),
    }
}

fn recent_transaction_model(tx: TrackerTransaction) -> recent_transactions::ActiveModel {
    recent_transactions::ActiveModel {
        hash: Set(tx.hash),
        block_timestamp: Set(tx.block_timestamp),
        value: Set(tx.value),
        method: Set(tx.method),
    }
}

fn loan_model(loan: BalancedLoan, updated_at: NaiveDateTime) -> AppResult<balanced_loans::ActiveModel> {
    Ok(balanced_loans::ActiveModel {
        pos_id: Set(loan.pos_id),
        address: Set(loan.address),
        created: Set(loan.created),
        collateral: Set(loan.collateral),
        ratio: Set(loan.ratio),
        total_debt: Set(loan.total_debt),
        standing: Set(loan.standing),
        assets: Set(serde_json::to_value(&loan.assets)?),
        holdings: Set(loan.holdings),
        standings: Set(loan.standings),
        updated_at: Set(updated_at),
    })
}

fn pool_static_model(data: PoolStaticData) -> balanced_pool_static_data::ActiveModel {
    balanced_pool_static_data::ActiveModel {
        id: Set(data.id as i32),
        base_decimals: Set(data.base_decimals as i32),
        base_name: Set(data.base_name),
        base_token: Set(data.base_token),
        base_symbol: Set(data.base_symbol),
        min_quote: Set(data.min_quote),
        pool_name: Set(data.pool_name),
        quote_decimals: Set(data.quote_decimals as i32),
        quote_name: Set(data.quote_name),
        quote_token: Set(data.quote_token),
        quote_symbol: Set(data.quote_symbol),
    }
}

/// Pool snapshots are rejected before the chain existed.
pub fn validate_snapshot_timestamp(timestamp: Option<i64>) -> AppResult<()> {
    match timestamp {
        Some(ts) if ts < GENESIS_TIMESTAMP_S => Err(AppError::Unprocessable(format!(
            "timestamp must be greater than or equal to {}",
            GENESIS_TIMESTAMP_S
        ))),
        _ => Ok(()),
    }
}

#[derive(Clone)]
pub struct SnapshotService {
    db: Arc<DatabaseConnection>,
    icx: IcxService,
    tracker: TrackerService,
    balanced: BalancedService,
    gov: GovService,
}

impl SnapshotService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        icx: IcxService,
        tracker: TrackerService,
        balanced: BalancedService,
        gov: GovService,
    ) -> Self {
        Self {
            db,
            icx,
            tracker,
            balanced,
            gov,
        }
    }

    /// Inserts the latest `limit` blocks that are not stored yet.
    pub async fn sync_recent_blocks(&self, limit: u64) -> AppResult<usize> {
        let blocks = self.tracker.get_blocks_raw(limit, "desc").await?;
        if blocks.is_empty() {
            return Ok(0);
        }
        let inserted = recent_blocks::Entity::insert_many(blocks.into_iter().map(recent_block_model))
            .on_conflict(
                OnConflict::column(recent_blocks::Column::Number)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await?;
        tracing::debug!(inserted, "Recent blocks written");
        Ok(inserted as usize)
    }

    pub async fn sync_recent_transactions(&self, limit: u64) -> AppResult<usize> {
        let filter = TransactionFilter {
            limit,
            ..Default::default()
        };
        let transactions = self.tracker.get_transactions_raw(&filter).await?;
        let count = transactions.len();
        if count == 0 {
            return Ok(0);
        }
        recent_transactions::Entity::insert_many(
            transactions.into_iter().map(recent_transaction_model),
        )
        .on_conflict(
            OnConflict::column(recent_transactions::Column::Hash)
                .update_columns([
                    recent_transactions::Column::BlockTimestamp,
                    recent_transactions::Column::Value,
                    recent_transactions::Column::Method,
                ])
                .to_owned(),
        )
        .exec_without_returning(self.db.as_ref())
        .await?;
        Ok(count)
    }

    /// Replaces every stored loan position with its current on-chain state.
    pub async fn sync_balanced_loans(&self) -> AppResult<usize> {
        let loans = self.balanced.get_loans().await?;
        let now = Utc::now().naive_utc();
        let models = loans
            .into_iter()
            .map(|loan| loan_model(loan, now))
            .collect::<AppResult<Vec<_>>>()?;

        for chunk in models.chunks(INSERT_CHUNK) {
            balanced_loans::Entity::insert_many(chunk.to_vec())
                .on_conflict(
                    OnConflict::column(balanced_loans::Column::PosId)
                        .update_columns([
                            balanced_loans::Column::Address,
                            balanced_loans::Column::Created,
                            balanced_loans::Column::Collateral,
                            balanced_loans::Column::Ratio,
                            balanced_loans::Column::TotalDebt,
                            balanced_loans::Column::Standing,
                            balanced_loans::Column::Assets,
                            balanced_loans::Column::Holdings,
                            balanced_loans::Column::Standings,
                            balanced_loans::Column::UpdatedAt,
                        ])
                        .to_owned(),
                )
                .exec_without_returning(self.db.as_ref())
                .await?;
        }
        tracing::info!(count = models.len(), "Balanced loans written");
        Ok(models.len())
    }

    pub async fn sync_pool_static_data(&self) -> AppResult<usize> {
        let pools = self.balanced.get_pools(None).await?;
        let count = pools.len();
        if count == 0 {
            return Ok(0);
        }
        balanced_pool_static_data::Entity::insert_many(
            pools.iter().map(|pool| pool_static_model(pool.static_data())),
        )
        .on_conflict(
            OnConflict::column(balanced_pool_static_data::Column::Id)
                .update_columns([
                    balanced_pool_static_data::Column::BaseDecimals,
                    balanced_pool_static_data::Column::BaseName,
                    balanced_pool_static_data::Column::BaseToken,
                    balanced_pool_static_data::Column::BaseSymbol,
                    balanced_pool_static_data::Column::MinQuote,
                    balanced_pool_static_data::Column::PoolName,
                    balanced_pool_static_data::Column::QuoteDecimals,
                    balanced_pool_static_data::Column::QuoteName,
                    balanced_pool_static_data::Column::QuoteToken,
                    balanced_pool_static_data::Column::QuoteSymbol,
                ])
                .to_owned(),
        )
        .exec_without_returning(self.db.as_ref())
        .await?;
        Ok(count)
    }

    /// Snapshots every pool at the block for `timestamp` (seconds), or at
    /// the latest block. The row is keyed by the minute of `timestamp`.
    pub async fn sync_pool_dynamic_data(&self, timestamp: Option<i64>) -> AppResult<usize> {
        validate_snapshot_timestamp(timestamp)?;

        let block_height = match timestamp {
            Some(ts) => self.tracker.get_block_from_timestamp(ts).await?,
            None => self.icx.get_latest_height().await?,
        };
        tracing::info!(block_height, "Fetching Balanced pool dynamic data");

        let pools = self.balanced.get_pools(Some(block_height)).await?;
        let data: Vec<PoolDynamicData> = pools.iter().map(|pool| pool.dynamic_data()).collect();
        let count = data.len();

        let snapshot = balanced_pool_dynamic_snapshots::ActiveModel {
            timestamp: Set(get_datetime_in_utc(timestamp, TimePrecision::Minute)),
            block_height: Set(block_height as i64),
            data: Set(serde_json::to_value(&data)?),
        };
        balanced_pool_dynamic_snapshots::Entity::insert(snapshot)
            .on_conflict(
                OnConflict::column(balanced_pool_dynamic_snapshots::Column::Timestamp)
                    .update_columns([
                        balanced_pool_dynamic_snapshots::Column::BlockHeight,
                        balanced_pool_dynamic_snapshots::Column::Data,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await?;
        Ok(count)
    }

    pub async fn sync_quotes(&self) -> AppResult<usize> {
        let (icx_usd, sicx_bnusd, sicx_icx) = tokio::try_join!(
            self.icx.get_icx_usd_price(None),
            self.balanced.get_price_by_name(SICX_BNUSD_POOL),
            self.balanced.get_price_by_name(SICX_ICX_POOL),
        )?;

        let quote = icx_sicx_bnusd_quotes::ActiveModel {
            timestamp: Set(get_datetime_in_utc(None, TimePrecision::Minute)),
            icx_usd: Set(icx_usd),
            sicx_bnusd: Set(sicx_bnusd),
            sicx_icx: Set(sicx_icx),
        };
        icx_sicx_bnusd_quotes::Entity::insert(quote)
            .on_conflict(
                OnConflict::column(icx_sicx_bnusd_quotes::Column::Timestamp)
                    .update_columns([
                        icx_sicx_bnusd_quotes::Column::IcxUsd,
                        icx_sicx_bnusd_quotes::Column::SicxBnusd,
                        icx_sicx_bnusd_quotes::Column::SicxIcx,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await?;
        Ok(1)
    }

    pub async fn sync_validator_node_statuses(&self) -> AppResult<usize> {
        let statuses = self.gov.get_validators_node_status().await?;
        if statuses.is_empty() {
            return Ok(0);
        }
        let timestamp = get_datetime_in_utc(None, TimePrecision::Minute);
        let count = statuses.len();
        validator_node_statuses::Entity::insert_many(statuses.into_iter().map(|(address, status)| {
            validator_node_statuses::ActiveModel {
                address: Set(address),
                timestamp: Set(timestamp),
                status: Set(status),
            }
        }))
        .on_conflict(
            OnConflict::column(validator_node_statuses::Column::Address)
                .update_columns([
                    validator_node_statuses::Column::Timestamp,
                    validator_node_statuses::Column::Status,
                ])
                .to_owned(),
        )
        .exec_without_returning(self.db.as_ref())
        .await?;
        Ok(count)
    }

    /// Drops all but the newest `keep` rows of the recent block and
    /// transaction caches. Returns the number of deleted rows.
    pub async fn prune_recent(&self, keep: u64) -> AppResult<u64> {
        let mut deleted = 0;

        let oldest_kept_block = recent_blocks::Entity::find()
            .order_by_desc(recent_blocks::Column::Number)
            .offset(keep.saturating_sub(1))
            .limit(1)
            .one(self.db.as_ref())
            .await?;
        if let Some(block) = oldest_kept_block {
            deleted += recent_blocks::Entity::delete_many()
                .filter(recent_blocks::Column::Number.lt(block.number))
                .exec(self.db.as_ref())
                .await?
                .rows_affected;
        }

        let oldest_kept_tx = recent_transactions::Entity::find()
            .order_by_desc(recent_transactions::Column::BlockTimestamp)
            .offset(keep.saturating_sub(1))
            .limit(1)
            .one(self.db.as_ref())
            .await?;
        if let Some(tx) = oldest_kept_tx {
            deleted += recent_transactions::Entity::delete_many()
                .filter(recent_transactions::Column::BlockTimestamp.lt(tx.block_timestamp))
                .exec(self.db.as_ref())
                .await?
                .rows_affected;
        }

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::balanced::LoanAssets;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_snapshot_timestamp_must_follow_genesis() {
        assert!(validate_snapshot_timestamp(None).is_ok());
        assert!(validate_snapshot_timestamp(Some(GENESIS_TIMESTAMP_S)).is_ok());
        assert!(matches!(
            validate_snapshot_timestamp(Some(GENESIS_TIMESTAMP_S - 1)),
            Err(AppError::Unprocessable(_))
        ));
    }

    #[test]
    fn test_loan_model_keeps_assets_as_json() {
        let created = get_datetime_in_utc(Some(1_650_000_000), TimePrecision::Second);
        let loan = BalancedLoan {
            pos_id: 7,
            address: "hx01".to_string(),
            created,
            assets: LoanAssets {
                sicx: dec!(1000),
                bnusd: dec!(250.5),
            },
            collateral: dec!(1000),
            ratio: dec!(3.2),
            total_debt: dec!(250.5),
            standing: "Mining".to_string(),
            holdings: json!({}),
            standings: json!({}),
        };
        let model = loan_model(loan, created).unwrap();
        assert_eq!(model.pos_id, Set(7));
        assert_eq!(model.ratio, Set(dec!(3.2)));
        assert_eq!(model.assets, Set(json!({ "sicx": "1000", "bnusd": "250.5" })));
    }

    #[test]
    fn test_recent_transaction_model() {
        let tx: TrackerTransaction = serde_json::from_value(json!({
            "block_number": 100,
            "block_timestamp": 1_650_000_000_000_000i64,
            "hash": "0xabc",
            "method": "",
            "value": "0xde0b6b3a7640000"
        }))
        .unwrap();
        let model = recent_transaction_model(tx);
        assert_eq!(model.hash, Set("0xabc".to_string()));
        assert_eq!(model.method, Set(None));
        assert_eq!(model.value, Set("0xde0b6b3a7640000".to_string()));
    }
}
