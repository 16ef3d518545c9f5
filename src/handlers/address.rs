use axum::{
    Form,
    extract::{Path, Query, State},
    response::Html,
};
use serde::Deserialize;

use super::{PageQuery, or_empty};
use crate::AppState;
use crate::data::regex::is_address;
use crate::error::{AppError, AppResult};
use crate::utils::calculate_skip;
use crate::views::components;

fn check_address(address: &str) -> AppResult<()> {
    if is_address(address) {
        Ok(())
    } else {
        Err(AppError::Unprocessable(format!("invalid address: {}", address)))
    }
}

pub async fn overview(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> AppResult<Html<String>> {
    check_address(&address)?;
    let details = or_empty(
        state.tracker.get_address_details(&address).await,
        "address details",
    );
    Ok(Html(components::address_overview(&details)))
}

pub async fn transactions(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Html<String>> {
    check_address(&address)?;
    let (page, limit) = query.validated(50, 25, Some(100))?;
    let transactions = or_empty(
        state
            .tracker
            .get_address_transactions(&address, limit, calculate_skip(page, limit)?)
            .await,
        "address transactions",
    );
    Ok(Html(components::address_transactions(
        &address,
        &transactions,
        page,
        limit,
        query.refresh,
    )))
}

/// Saved addresses arrive as `?hx…=name` pairs, kept in query order.
pub async fn address_book(Query(entries): Query<Vec<(String, String)>>) -> Html<String> {
    Html(components::address_book(&entries))
}

#[derive(Debug, Deserialize)]
pub struct RegisterAddressForm {
    #[serde(rename = "icx-address")]
    pub icx_address: String,
    pub name: String,
}

pub async fn register_address(Form(form): Form<RegisterAddressForm>) -> Html<String> {
    Html(components::register_address(&form.icx_address, &form.name))
}
