//! Prints `{contract address: name}` for every named contract on the legacy
//! tracker, as JSON.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rhizome_tracker::services::http_request::HttpReq;

const CONTRACT_LIST_URL: &str = "https://main.tracker.solidwallet.io/v3/contract/list";
const PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize)]
struct ContractListResponse {
    #[serde(default)]
    data: Vec<ContractEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContractEntry {
    address: String,
    contract_name: Option<String>,
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

    let http = HttpReq::new();
    let mut names = BTreeMap::new();
    let mut page = 1;

    loop {
        let url = format!("{}?page={}&count={}", CONTRACT_LIST_URL, page, PAGE_SIZE);
        let response: ContractListResponse = http.get_json(&url, None).await?;
        if response.data.is_empty() {
            break;
        }
        tracing::info!(page, count = response.data.len(), "Fetched contract page");
        for contract in response.data {
            if let Some(name) = contract.contract_name.filter(|n| n != "-") {
                names.insert(contract.address, name);
            }
        }
        page += 1;
    }

    println!("{}", serde_json::to_string_pretty(&names)?);
    Ok(())
}
