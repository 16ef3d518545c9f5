//! Prints `{validator address: name}` from the legacy tracker, as JSON.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rhizome_tracker::services::http_request::HttpReq;

const PREP_LIST_URL: &str = "https://main.tracker.solidwallet.io/v3/iiss/prep/list?count=500";

#[derive(Debug, Deserialize)]
struct PrepListResponse {
    #[serde(default)]
    data: Vec<PrepEntry>,
}

#[derive(Debug, Deserialize)]
struct PrepEntry {
    address: String,
    #[serde(default)]
    name: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rhizome_tracker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let response: PrepListResponse = HttpReq::new().get_json(PREP_LIST_URL, None).await?;
    tracing::info!(count = response.data.len(), "Fetched validators");

    let names: BTreeMap<String, String> = response
        .data
        .into_iter()
        .map(|prep| (prep.address, prep.name))
        .collect();

    println!("{}", serde_json::to_string_pretty(&names)?);
    Ok(())
}
