//! Validator (P-Rep) queries and node liveness checks.

use futures_util::stream::{self, StreamExt};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;

use crate::config::CHAIN_CONTRACT;
use crate::data::regex::is_host;
use crate::error::AppResult;
use crate::models::de::flexible_u64;
use crate::models::icx::PRepsResponse;
use crate::services::http_request::HttpReq;
use crate::services::icx::IcxService;

pub const NODE_MONITOR_URL: &str =
    "https://icon2.mon.solidwallet.io/api/v1/items/influxdb/default?init=5";
const NODE_PORT: u16 = 9000;
const NODE_TIMEOUT: Duration = Duration::from_secs(5);
const NODE_RETRIES: u32 = 5;

#[derive(Debug, Deserialize)]
struct MonitorResponse {
    #[serde(default)]
    data: Vec<MonitorItem>,
}

#[derive(Debug, Deserialize)]
struct MonitorItem {
    items: MonitorItemFields,
    tags: MonitorTags,
}

#[derive(Debug, Deserialize)]
struct MonitorItemFields {
    #[serde(default)]
    address: String,
}

#[derive(Debug, Deserialize)]
struct MonitorTags {
    #[serde(default)]
    public_ip: String,
}

#[derive(Debug, Deserialize)]
struct NodeChain {
    #[serde(deserialize_with = "flexible_u64")]
    height: u64,
}

#[derive(Clone)]
pub struct GovService {
    icx: IcxService,
    http: HttpReq,
    monitor_url: String,
    node_port: u16,
    max_workers: usize,
}

impl GovService {
    pub fn new(icx: IcxService, http: HttpReq, max_workers: usize) -> Self {
        Self {
            icx,
            http,
            monitor_url: NODE_MONITOR_URL.to_string(),
            node_port: NODE_PORT,
            max_workers: max_workers.max(1),
        }
    }

    pub fn with_monitor_url(mut self, url: &str) -> Self {
        self.monitor_url = url.to_string();
        self
    }

    pub fn with_node_port(mut self, port: u16) -> Self {
        self.node_port = port;
        self
    }

    pub async fn get_validators(&self) -> AppResult<PRepsResponse> {
        self.icx
            .call_as(CHAIN_CONTRACT, "getPReps", json!({}), None)
            .await
    }

    pub async fn get_validator_count(&self) -> AppResult<usize> {
        Ok(self.get_validators().await?.preps.len())
    }

    /// Node address -> `http://{public_ip}:{port}` from the monitoring API.
    async fn get_node_endpoints(&self) -> AppResult<HashMap<String, String>> {
        let response: MonitorResponse = self.http.get_json(&self.monitor_url, None).await?;
        Ok(response
            .data
            .into_iter()
            .filter(|item| item.items.address.starts_with("hx") && is_host(&item.tags.public_ip))
            .map(|item| {
                (
                    item.items.address,
                    format!("http://{}:{}", item.tags.public_ip, self.node_port),
                )
            })
            .collect())
    }

    /// A node is up when it reports a height at or above `last_block`.
    async fn check_node_status(&self, node_endpoint: &str, last_block: u64) -> bool {
        let url = format!("{}/admin/chain/0x1", node_endpoint);
        let Some(response) = self
            .http
            .get_with(&url, None, NODE_TIMEOUT, NODE_RETRIES)
            .await
        else {
            return false;
        };
        match response.json::<NodeChain>().await {
            Ok(chain) => {
                tracing::debug!(%node_endpoint, height = chain.height, last_block, "Node status checked");
                chain.height >= last_block
            }
            Err(e) => {
                tracing::debug!(%node_endpoint, error = %e, "Node returned unreadable chain status");
                false
            }
        }
    }

    /// Validator address -> node up/down.
    pub async fn get_validators_node_status(&self) -> AppResult<HashMap<String, bool>> {
        let endpoints = self.get_node_endpoints().await?;
        let last_block = self.icx.get_latest_height().await?;

        let checks: Vec<(String, bool)> = stream::iter(endpoints)
            .map(|(node_address, endpoint)| async move {
                let up = self.check_node_status(&endpoint, last_block).await;
                (node_address, up)
            })
            .buffer_unordered(self.max_workers)
            .collect()
            .await;

        let validators = self.get_validators().await?;
        let node_to_validator: HashMap<String, String> = validators
            .preps
            .into_iter()
            .map(|v| (v.node_address, v.address))
            .collect();

        Ok(checks
            .into_iter()
            .filter_map(|(node_address, up)| {
                node_to_validator
                    .get(&node_address)
                    .map(|address| (address.clone(), up))
            })
            .collect())
    }
}
