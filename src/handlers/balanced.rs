use axum::{
    extract::{Query, State},
    response::Html,
};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::Deserialize;

use super::or_empty;
use crate::AppState;
use crate::entities::{balanced_loans, icx_sicx_bnusd_quotes};
use crate::error::{AppError, AppResult};
use crate::models::balanced::{
    BalancedLoan, LoanSort, LoanView, LoansOverview, PoolView, bnusd_price_points, sort_loans,
};
use crate::models::icx::SortDirection;
use crate::services::balanced::LIQUIDATIONS_PAGE_SIZE;
use crate::utils::{calculate_skip, format_number};
use crate::views::components;

/// Minute quotes shown on the bnUSD chart (one day).
const BNUSD_CHART_POINTS: u64 = 1440;

pub async fn dao_fund_balance_sheet(State(state): State<AppState>) -> Html<String> {
    let mut assets = or_empty(
        state.balanced_api.get_daofund_balance_sheet().await,
        "DAO fund balance sheet",
    );
    assets.sort_by_key(|asset| asset.symbol.to_lowercase());
    Html(components::dao_fund_balance_sheet(&assets))
}

#[derive(Debug, Deserialize)]
pub struct LiquidationsQuery {
    #[serde(default = "first_page")]
    pub page: u64,
}

fn first_page() -> u64 {
    1
}

pub async fn liquidations(
    State(state): State<AppState>,
    Query(query): Query<LiquidationsQuery>,
) -> AppResult<Html<String>> {
    if query.page < 1 {
        return Err(AppError::Unprocessable("page must be at least 1".to_string()));
    }
    calculate_skip(query.page, LIQUIDATIONS_PAGE_SIZE)?;
    let liquidations = or_empty(
        state.balanced.get_liquidations(query.page).await,
        "Balanced liquidations",
    );
    Ok(Html(components::liquidations(&liquidations, query.page)))
}

#[derive(Debug, Deserialize)]
pub struct LoansQuery {
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
    #[serde(default)]
    pub show_liquidated: bool,
}

/// `desc` sorts descending; anything else ascending.
pub fn sort_direction(value: Option<&str>) -> SortDirection {
    match value {
        Some("desc") => SortDirection::Desc,
        _ => SortDirection::Asc,
    }
}

pub async fn loans(
    State(state): State<AppState>,
    Query(query): Query<LoansQuery>,
) -> AppResult<Html<String>> {
    let sort_by: LoanSort = query
        .sort_by
        .as_deref()
        .unwrap_or("id")
        .parse()
        .map_err(AppError::Unprocessable)?;
    let sort_dir = sort_direction(query.sort_dir.as_deref());

    let mut select = balanced_loans::Entity::find();
    if !query.show_liquidated {
        select = select.filter(balanced_loans::Column::Ratio.gt(Decimal::ZERO));
    }
    let rows = or_empty(
        select.all(state.db.as_ref()).await.map_err(AppError::from),
        "stored loans",
    );
    let mut loans: Vec<BalancedLoan> = rows.into_iter().map(BalancedLoan::from).collect();
    sort_loans(&mut loans, sort_by, sort_dir);

    let views: Vec<LoanView> = loans.iter().map(LoanView::from).collect();
    let loan_count = format_number(Decimal::from(views.len()), 0, false);
    Ok(Html(components::loans(
        &views,
        &loan_count,
        sort_by,
        sort_dir,
        query.show_liquidated,
    )))
}

pub async fn loans_overview(State(state): State<AppState>) -> Html<String> {
    let ratios: Vec<Decimal> = or_empty(
        balanced_loans::Entity::find()
            .select_only()
            .column(balanced_loans::Column::Ratio)
            .into_tuple()
            .all(state.db.as_ref())
            .await
            .map_err(AppError::from),
        "stored loan ratios",
    );
    let (collateral, debt) = tokio::join!(
        state.balanced.get_loan_collateral(),
        state.balanced.get_total_debt(),
    );
    let collateral = or_empty(collateral, "loan collateral");
    let debt = or_empty(debt, "total debt");
    Html(components::loans_overview(&LoansOverview::new(&ratios, collateral, debt)))
}

pub async fn stability_fund(State(state): State<AppState>) -> Html<String> {
    let assets = or_empty(state.balanced.get_stability_fund().await, "stability fund");
    Html(components::stability_fund(&assets))
}

pub async fn pools(State(state): State<AppState>) -> Html<String> {
    let pools = or_empty(state.balanced.get_pools(None).await, "Balanced pools");
    let views: Vec<PoolView> = pools.iter().map(PoolView::from).collect();
    Html(components::pools(&views))
}

pub async fn bnusd_price_chart(State(state): State<AppState>) -> Html<String> {
    let mut quotes = or_empty(
        icx_sicx_bnusd_quotes::Entity::find()
            .order_by_desc(icx_sicx_bnusd_quotes::Column::Timestamp)
            .limit(BNUSD_CHART_POINTS)
            .all(state.db.as_ref())
            .await
            .map_err(AppError::from),
        "stored quotes",
    );
    quotes.reverse();
    Html(components::bnusd_price_chart(&bnusd_price_points(&quotes)))
}
