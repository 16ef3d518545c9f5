//! Full-page routes, search, and the status endpoints.

use axum::{
    Form,
    extract::{OriginalUri, Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use super::{PageQuery, or_empty};
use crate::AppState;
use crate::data::regex::{ICX_HEX_ADDRESS_REGEX, ICX_HEX_CONTRACT_REGEX, is_address, is_tx_hash};
use crate::error::{AppError, AppResult};
use crate::models::balanced::liquidation_summary;
use crate::views::pages;

/// Default image served for missing validator and token logos.
pub const FALLBACK_LOGO: &str = "/assets/validators/validator_128px.png";

pub async fn home() -> Html<String> {
    Html(pages::home())
}

pub async fn address(
    Path(address): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Html<String>> {
    if !is_address(&address) {
        return Err(AppError::Unprocessable(format!("invalid address: {}", address)));
    }
    let (page, limit) = query.validated(50, 25, Some(100))?;
    Ok(Html(pages::address(&address, page, limit, query.refresh)))
}

pub async fn addresses(Query(query): Query<PageQuery>) -> AppResult<Html<String>> {
    let (page, _) = query.validated(25, 1, None)?;
    Ok(Html(pages::addresses(page)))
}

pub async fn block(
    State(state): State<AppState>,
    Path(height): Path<String>,
) -> AppResult<Html<String>> {
    let height: u64 = height
        .parse()
        .ok()
        .filter(|h| *h >= 1)
        .ok_or_else(|| AppError::Unprocessable(format!("invalid block height: {}", height)))?;
    let block = state.icx.get_block(Some(height)).await.map_err(|e| match e {
        AppError::Rpc { .. } => AppError::NotFound(format!("block {}", height)),
        other => other,
    })?;
    Ok(Html(pages::block(&block)))
}

pub async fn btp() -> Html<String> {
    Html(pages::btp())
}

pub async fn build() -> Html<String> {
    Html(pages::build())
}

pub async fn contract(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> AppResult<Html<String>> {
    if !ICX_HEX_CONTRACT_REGEX.is_match(&address) {
        return Err(AppError::Unprocessable(format!("invalid contract: {}", address)));
    }
    let methods = or_empty(state.icx.get_score_api(&address, None).await, "contract ABI");
    Ok(Html(pages::contract(&address, &methods)))
}

pub async fn contracts(Query(query): Query<PageQuery>) -> AppResult<Html<String>> {
    let (page, limit) = query.validated(25, 25, None)?;
    Ok(Html(pages::contracts(page, limit)))
}

pub async fn dapps() -> Html<String> {
    Html(pages::dapps())
}

pub async fn balanced() -> Html<String> {
    Html(pages::balanced())
}

pub async fn balanced_liquidations() -> Html<String> {
    Html(pages::balanced_liquidations())
}

pub async fn balanced_loans() -> Html<String> {
    Html(pages::balanced_loans())
}

pub async fn governance() -> Html<String> {
    Html(pages::governance())
}

pub async fn tokens(Query(query): Query<PageQuery>) -> AppResult<Html<String>> {
    let (page, _) = query.validated(100, 1, None)?;
    Ok(Html(pages::tokens(page)))
}

pub async fn transaction(
    State(state): State<AppState>,
    Path(tx_hash): Path<String>,
) -> AppResult<Html<String>> {
    if !is_tx_hash(&tx_hash) {
        return Err(AppError::Unprocessable(format!("invalid transaction hash: {}", tx_hash)));
    }
    let fetched = tokio::try_join!(
        state.tracker.get_transaction_details(&tx_hash),
        state.tracker.get_transaction_logs(&tx_hash),
        state.icx.get_latest_height(),
    );
    let (detail, logs, latest_height) = match fetched {
        Ok(fetched) => fetched,
        // Hashes the node does not know are a 404.
        Err(e) => {
            return Err(match state.icx.get_transaction(&tx_hash).await {
                Err(AppError::Rpc { .. }) => AppError::NotFound(format!("transaction {}", tx_hash)),
                _ => e,
            });
        }
    };
    let detail = detail.into_view(latest_height);
    let summary = liquidation_summary(&detail, &logs);
    Ok(Html(pages::transaction(&detail, summary.as_deref(), &logs)))
}

pub async fn transactions(Query(query): Query<PageQuery>) -> AppResult<Html<String>> {
    let (page, limit) = query.validated(50, 25, Some(100))?;
    Ok(Html(pages::transactions(page, limit, query.refresh)))
}

pub async fn validator(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> AppResult<Html<String>> {
    if !ICX_HEX_ADDRESS_REGEX.is_match(&address) {
        return Err(AppError::Unprocessable(format!("invalid validator: {}", address)));
    }
    let validators = or_empty(state.tracker.get_validators().await, "tracker validators");
    let prep = validators.iter().find(|prep| prep.address == address);
    Ok(Html(pages::validator(&address, prep)))
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    pub search: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum SearchTarget {
    Address,
    Contract,
    Transaction,
    Block(u64),
    Unknown,
}

/// Classifies a search term by prefix and length.
pub fn classify_search(term: &str) -> SearchTarget {
    match (term.get(..2), term.len()) {
        (Some("hx"), 42) => SearchTarget::Address,
        (Some("cx"), 42) => SearchTarget::Contract,
        (Some("0x"), 66) => SearchTarget::Transaction,
        _ => match term.parse::<u64>() {
            Ok(height) if height > 0 => SearchTarget::Block(height),
            _ => SearchTarget::Unknown,
        },
    }
}

/// Where a search lands. Block heights past `latest_height` go to the 404 page.
pub fn search_redirect(term: &str, latest_height: Option<u64>) -> String {
    match classify_search(term) {
        SearchTarget::Address => format!("/address/{}/", term),
        SearchTarget::Contract => format!("/contract/{}/", term),
        SearchTarget::Transaction => format!("/transaction/{}/", term),
        SearchTarget::Block(height) if latest_height.is_some_and(|latest| height <= latest) => {
            format!("/block/{}/", height)
        }
        _ => "/404/".to_string(),
    }
}

/// Answers with an `hx-redirect` header for htmx to follow.
pub async fn search(State(state): State<AppState>, Form(form): Form<SearchForm>) -> Response {
    let term = form.search.trim();
    let latest_height = match classify_search(term) {
        SearchTarget::Block(_) => match state.icx.get_latest_height().await {
            Ok(height) => Some(height),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch latest height for search");
                None
            }
        },
        _ => None,
    };
    let target = search_redirect(term, latest_height);
    tracing::debug!(%term, %target, "Search redirect");

    let mut headers = HeaderMap::new();
    match HeaderValue::from_str(&target) {
        Ok(value) => {
            headers.insert("hx-redirect", value);
        }
        Err(_) => {
            headers.insert("hx-redirect", HeaderValue::from_static("/404/"));
        }
    }
    (StatusCode::OK, headers).into_response()
}

// ---------------------------------------------------------------------------
// Status & errors
// ---------------------------------------------------------------------------

pub async fn status(State(state): State<AppState>) -> Html<String> {
    Html(pages::status(state.tracker.is_up().await))
}

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn not_found() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html(pages::not_found()))
}

/// Missing static files: logos fall back to the default image, anything
/// else is a 404 page.
pub async fn asset_not_found(OriginalUri(uri): OriginalUri) -> Response {
    let path = uri.path();
    if path.starts_with("/assets/validators/") || path.starts_with("/assets/tokens/") {
        Redirect::temporary(FALLBACK_LOGO).into_response()
    } else {
        not_found().await.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_search() {
        let hx = format!("hx{}", "a".repeat(40));
        let cx = format!("cx{}", "b".repeat(40));
        let tx = format!("0x{}", "c".repeat(64));
        assert_eq!(classify_search(&hx), SearchTarget::Address);
        assert_eq!(classify_search(&cx), SearchTarget::Contract);
        assert_eq!(classify_search(&tx), SearchTarget::Transaction);
        assert_eq!(classify_search("12345"), SearchTarget::Block(12345));
        assert_eq!(classify_search("0"), SearchTarget::Unknown);
        assert_eq!(classify_search("hx123"), SearchTarget::Unknown);
        assert_eq!(classify_search("balanced"), SearchTarget::Unknown);
        assert_eq!(classify_search("é"), SearchTarget::Unknown);
    }

    #[test]
    fn test_search_redirect() {
        let hx = format!("hx{}", "a".repeat(40));
        assert_eq!(search_redirect(&hx, None), format!("/address/{}/", hx));
        assert_eq!(search_redirect("100", Some(1000)), "/block/100/");
        assert_eq!(search_redirect("1000", Some(1000)), "/block/1000/");
        assert_eq!(search_redirect("1001", Some(1000)), "/404/");
        assert_eq!(search_redirect("100", None), "/404/");
        assert_eq!(search_redirect("nothing", Some(1000)), "/404/");
    }
}
