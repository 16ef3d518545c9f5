//! Contribution Proposal System contract.

use moka::future::Cache;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::config::CPS_CONTRACT;
use crate::error::AppResult;
use crate::models::cps::CpsValidator;
use crate::services::icx::IcxService;

#[derive(Clone)]
pub struct CpsService {
    icx: IcxService,
    cache: Arc<Cache<(), Arc<HashSet<String>>>>,
}

impl CpsService {
    pub fn new(icx: IcxService) -> Self {
        Self {
            icx,
            cache: Arc::new(
                Cache::builder()
                    .max_capacity(1)
                    .time_to_live(Duration::from_secs(3600))
                    .build(),
            ),
        }
    }

    /// Addresses of validators taking part in CPS.
    pub async fn get_cps_validators(&self) -> AppResult<Arc<HashSet<String>>> {
        if let Some(validators) = self.cache.get(&()).await {
            return Ok(validators);
        }
        let preps: Vec<CpsValidator> = self
            .icx
            .call_as(CPS_CONTRACT, "get_PReps", json!({}), None)
            .await?;
        let validators: Arc<HashSet<String>> =
            Arc::new(preps.into_iter().map(|v| v.address).collect());
        tracing::debug!(count = validators.len(), "Loaded CPS validators");
        self.cache.insert((), validators.clone()).await;
        Ok(validators)
    }
}
