//! JSON API under `/api/v1/icx`.

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{Duration, NaiveDateTime};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::AppState;
use crate::entities::icx_sicx_bnusd_quotes;
use crate::error::{AppError, AppResult};
use crate::models::icx::ChainBlock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePrecision {
    Minute,
    Hour,
    Day,
}

impl FromStr for TimePrecision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minute" => Ok(Self::Minute),
            "hour" => Ok(Self::Hour),
            "day" => Ok(Self::Day),
            _ => Err(r#"Valid time_precision values are "minute", "hour", and "day"."#.to_string()),
        }
    }
}

impl TimePrecision {
    pub fn seconds(&self) -> i64 {
        match self {
            Self::Minute => 60,
            Self::Hour => 3_600,
            Self::Day => 86_400,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct QuotesQuery {
    pub time_value: i64,
    pub time_precision: String,
}

#[derive(Debug, Serialize)]
pub struct QuotesResponse {
    pub count: usize,
    pub data: Vec<icx_sicx_bnusd_quotes::Model>,
}

/// `[start, end)` window ending at the latest stored quote. Spans that reach
/// outside the representable date range are rejected.
pub fn quote_window(
    latest: NaiveDateTime,
    time_value: i64,
    precision: TimePrecision,
) -> AppResult<(NaiveDateTime, NaiveDateTime)> {
    time_value
        .checked_mul(precision.seconds())
        .and_then(Duration::try_seconds)
        .and_then(|span| latest.checked_sub_signed(span))
        .map(|start| (start, latest))
        .ok_or_else(|| AppError::Unprocessable(format!("time_value {} is out of range", time_value)))
}

pub async fn icx_sicx_bnusd_quotes(
    State(state): State<AppState>,
    Query(query): Query<QuotesQuery>,
) -> AppResult<Json<QuotesResponse>> {
    let precision: TimePrecision = query
        .time_precision
        .parse()
        .map_err(AppError::Unprocessable)?;
    if query.time_value < 0 {
        return Err(AppError::Unprocessable("time_value must not be negative".to_string()));
    }

    let Some(latest) = icx_sicx_bnusd_quotes::Entity::find()
        .order_by_desc(icx_sicx_bnusd_quotes::Column::Timestamp)
        .one(state.db.as_ref())
        .await?
    else {
        return Ok(Json(QuotesResponse {
            count: 0,
            data: Vec::new(),
        }));
    };

    let (start, end) = quote_window(latest.timestamp, query.time_value, precision)?;
    let data = icx_sicx_bnusd_quotes::Entity::find()
        .filter(icx_sicx_bnusd_quotes::Column::Timestamp.gte(start))
        .filter(icx_sicx_bnusd_quotes::Column::Timestamp.lt(end))
        .order_by_asc(icx_sicx_bnusd_quotes::Column::Timestamp)
        .all(state.db.as_ref())
        .await?;
    tracing::debug!(count = data.len(), %start, %end, "Serving stored quotes");

    Ok(Json(QuotesResponse {
        count: data.len(),
        data,
    }))
}

#[derive(Debug, Deserialize)]
pub struct LatestBlockQuery {
    #[serde(default)]
    pub height_only: bool,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum LatestBlock {
    Height(u64),
    Block(ChainBlock),
}

#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

pub async fn latest_block(
    State(state): State<AppState>,
    Query(query): Query<LatestBlockQuery>,
) -> AppResult<Json<DataResponse<LatestBlock>>> {
    let block = state.icx.get_block(None).await?;
    let data = if query.height_only {
        LatestBlock::Height(block.height)
    } else {
        LatestBlock::Block(block)
    };
    Ok(Json(DataResponse { data }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_time_precision() {
        assert_eq!("minute".parse::<TimePrecision>().unwrap().seconds(), 60);
        assert_eq!("day".parse::<TimePrecision>().unwrap(), TimePrecision::Day);
        assert!("week".parse::<TimePrecision>().is_err());
    }

    #[test]
    fn test_quote_window() {
        let latest = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let (start, end) = quote_window(latest, 2, TimePrecision::Hour).unwrap();
        assert_eq!(end, latest);
        assert_eq!(start, latest - Duration::hours(2));
    }

    #[test]
    fn test_quote_window_rejects_out_of_range_spans() {
        let latest = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        for (value, precision) in [
            (10_000_000_000, TimePrecision::Day),
            (i64::MAX, TimePrecision::Minute),
            (i64::MAX / 60, TimePrecision::Minute),
        ] {
            let err = quote_window(latest, value, precision).unwrap_err();
            assert!(matches!(err, AppError::Unprocessable(_)));
        }
    }

    #[test]
    fn test_latest_block_serializes_height_flat() {
        let body = serde_json::to_value(DataResponse {
            data: LatestBlock::Height(42),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "data": 42 }));
    }
}
