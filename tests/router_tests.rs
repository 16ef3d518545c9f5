mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use rhizome_tracker::entities::{icx_sicx_bnusd_quotes, recent_blocks};
use sea_orm::{DatabaseBackend, MockDatabase};

use crate::common::{app, app_with, empty_db, get, htmx_get, send, test_config};

fn address() -> String {
    format!("hx{}", "1".repeat(40))
}

fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post(uri: &str, host: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::HOST, host)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (status, _, body) = send(app("DEVELOPMENT"), get("/health-check/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn test_unknown_route_renders_not_found_page() {
    let (status, _, body) = send(app("DEVELOPMENT"), get("/no/such/page/")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("This page could not be found."));

    let (status, _, _) = send(app("DEVELOPMENT"), get("/404/")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_home_page_loads_modules_lazily() {
    let (status, _, body) = send(app("PRODUCTION"), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("/components/home/block-stream/"));
    assert!(body.contains("/components/icx/icx-usd-price/"));
}

#[tokio::test]
async fn test_address_page_validates_path() {
    let (status, _, body) = send(app("DEVELOPMENT"), get(&format!("/address/{}/", address()))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(&format!("/components/address/overview/{}/", address())));

    let (status, _, _) = send(app("DEVELOPMENT"), get("/address/hxnothing/")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let uri = format!("/address/{}/?limit=500", address());
    let (status, _, _) = send(app("DEVELOPMENT"), get(&uri)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_block_page_rejects_bad_heights() {
    let (status, _, _) = send(app("DEVELOPMENT"), get("/block/abc/")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (status, _, _) = send(app("DEVELOPMENT"), get("/block/0/")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_search_redirects_by_prefix() {
    let request = form_post("/search/", &format!("search={}", address()));
    let (status, headers, _) = send(app("DEVELOPMENT"), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["hx-redirect"], format!("/address/{}/", address()));

    let (_, headers, _) = send(app("DEVELOPMENT"), form_post("/search/", "search=balanced")).await;
    assert_eq!(headers["hx-redirect"], "/404/");
}

#[tokio::test]
async fn test_components_require_htmx_in_production() {
    let (status, _, _) = send(app("PRODUCTION"), get("/components/address-book/")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, body) = send(
        app("PRODUCTION"),
        htmx_get(&format!("/components/address-book/?{}=Alice", address())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Alice"));

    let (status, _, _) = send(app("DEVELOPMENT"), get("/components/address-book/")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_address_echoes_entry() {
    let body = format!("icx-address={}&name=Treasury", address());
    let (status, _, html) = send(app("DEVELOPMENT"), form_post("/components/address-book/", &body)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Treasury"));
    assert!(html.contains(&format!("/address/{}/", address())));
}

#[tokio::test]
async fn test_block_stream_reads_stored_blocks() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![recent_blocks::Model {
            number: 100,
            hash: format!("0x{}", "a".repeat(64)),
            timestamp: 1_700_000_000_000_000,
        }]])
        .into_connection();
    let (status, _, body) = send(app_with(db, "DEVELOPMENT"), get("/components/home/block-stream/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("/block/100/"));

    let (status, _, _) = send(app("DEVELOPMENT"), get("/components/home/block-stream/?limit=51")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_block_stream_degrades_to_empty() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<recent_blocks::Model>::new()])
        .into_connection();
    let (status, _, body) = send(app_with(db, "DEVELOPMENT"), get("/components/home/block-stream/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Nothing to show yet."));
}

#[tokio::test]
async fn test_sort_keys_are_validated() {
    let (status, _, _) = send(
        app("DEVELOPMENT"),
        get("/components/governance/validators/?sort_by=shoe_size"),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _, _) = send(app("DEVELOPMENT"), get("/components/balanced/loans/?sort_by=shoe_size")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_repos_rejects_untracked_owner() {
    let (status, _, body) = send(app("DEVELOPMENT"), get("/components/build/repos/?owner_name=octocat")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.contains("octocat"));
}

#[tokio::test]
async fn test_quotes_api() {
    let (status, _, _) = send(
        app("DEVELOPMENT"),
        get("/api/v1/icx/icx-sicx-bnusd-quotes/?time_value=1&time_precision=week"),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<icx_sicx_bnusd_quotes::Model>::new()])
        .into_connection();
    let (status, _, body) = send(
        app_with(db, "DEVELOPMENT"),
        get("/api/v1/icx/icx-sicx-bnusd-quotes/?time_value=1&time_precision=day"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json, serde_json::json!({ "count": 0, "data": [] }));
}

#[tokio::test]
async fn test_app_state_clones_share_mock_connection() {
    let state = rhizome_tracker::AppState::new(empty_db(), test_config("DEVELOPMENT"));
    let cloned = state.clone();
    assert!(std::sync::Arc::ptr_eq(&state.db, &cloned.db));
    let (status, _, _) = send(rhizome_tracker::build_router(cloned), get("/api/v1/icx/icx-sicx-bnusd-quotes/?time_value=1&time_precision=week")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_quotes_api_rejects_out_of_range_window() {
    let latest = icx_sicx_bnusd_quotes::Model {
        timestamp: chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap(),
        icx_usd: rust_decimal::Decimal::ONE,
        sicx_bnusd: rust_decimal::Decimal::ONE,
        sicx_icx: rust_decimal::Decimal::ONE,
    };
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![latest]])
        .into_connection();
    let (status, _, _) = send(
        app_with(db, "DEVELOPMENT"),
        get("/api/v1/icx/icx-sicx-bnusd-quotes/?time_value=10000000000&time_precision=day"),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_paged_components_reject_pages_past_row_range() {
    for uri in [
        "/components/contracts/?page=18446744073709551615&limit=1000",
        "/components/transactions/?page=18446744073709551615&limit=100",
        "/components/balanced/liquidations/?page=18446744073709551615",
    ] {
        let (status, _, _) = send(app("DEVELOPMENT"), htmx_get(uri)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", uri);
    }
}

#[tokio::test]
async fn test_sync_triggers_are_localhost_only_in_production() {
    let (status, _, _) = send(
        app("PRODUCTION"),
        post("/api/v1/database/recent-blocks/", "tracker.example.org"),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _, _) = send(
        app("PRODUCTION"),
        post("/api/v1/database/recent-blocks/", "localhost.example.org"),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_pool_snapshot_rejects_pre_genesis_timestamp() {
    let (status, _, _) = send(
        app("PRODUCTION"),
        post(
            "/api/v1/database/balanced/pool-dynamic-data-snapshot/?timestamp=5",
            "localhost:8000",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_missing_logo_falls_back_to_default_image() {
    let (status, headers, _) = send(app("DEVELOPMENT"), get("/assets/validators/unknown.png")).await;
    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(headers[header::LOCATION], "/assets/validators/validator_128px.png");

    let (status, _, _) = send(app("DEVELOPMENT"), get("/assets/css/missing.css")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_confirmations_need_height_or_hash() {
    let (status, _, _) = send(app("DEVELOPMENT"), get("/components/transaction/confirmations/")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _, _) = send(
        app("DEVELOPMENT"),
        get("/components/transaction/confirmations/?tx_hash=0x12"),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
