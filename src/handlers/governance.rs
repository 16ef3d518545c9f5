use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    response::Html,
};
use sea_orm::EntityTrait;
use serde::Deserialize;

use super::balanced::sort_direction;
use super::or_empty;
use crate::AppState;
use crate::entities::validator_node_statuses;
use crate::error::{AppError, AppResult};
use crate::models::icx::{
    IissOverview, Validator, ValidatorContext, ValidatorSort, sort_validators,
};
use crate::views::components;

pub async fn iiss_overview(State(state): State<AppState>) -> AppResult<Html<String>> {
    let (network_info, validators) =
        tokio::try_join!(state.icx.get_network_info(), state.gov.get_validators())?;
    let overview = IissOverview::new(&network_info, &validators.preps);
    Ok(Html(components::iiss_overview(&overview)))
}

#[derive(Debug, Deserialize)]
pub struct ValidatorsQuery {
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
}

/// Last stored liveness result per validator address.
async fn stored_node_statuses(state: &AppState) -> AppResult<HashMap<String, bool>> {
    let rows = validator_node_statuses::Entity::find().all(state.db.as_ref()).await?;
    Ok(rows.into_iter().map(|row| (row.address, row.status)).collect())
}

pub async fn validators(
    State(state): State<AppState>,
    Query(query): Query<ValidatorsQuery>,
) -> AppResult<Html<String>> {
    let sort_by: ValidatorSort = query
        .sort_by
        .as_deref()
        .unwrap_or("rank")
        .parse()
        .map_err(AppError::Unprocessable)?;
    let sort_dir = sort_direction(query.sort_dir.as_deref());

    let (raw, network_info, icx_usd_price, cps_validators) = tokio::try_join!(
        state.gov.get_validators(),
        state.icx.get_network_info(),
        state.icx.get_icx_usd_price(None),
        state.cps.get_cps_validators(),
    )?;
    let node_statuses = or_empty(stored_node_statuses(&state).await, "validator node statuses");

    let ctx = ValidatorContext {
        icx_usd_price,
        network_info: &network_info,
        cps_validators: &cps_validators,
        node_statuses: &node_statuses,
    };
    let mut validators: Vec<Validator> = raw
        .preps
        .into_iter()
        .enumerate()
        .map(|(i, raw)| Validator::new(i + 1, raw, &ctx))
        .collect();
    sort_validators(&mut validators, sort_by, sort_dir);
    tracing::debug!(count = validators.len(), sort_by = sort_by.as_str(), "Rendering validators");

    Ok(Html(components::validators(&validators, sort_by, sort_dir)))
}
