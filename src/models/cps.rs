use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::EXA;
use crate::utils::scale_hex;

/// Entry of the CPS contract's `get_PReps`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpsValidator {
    pub address: String,
    #[serde(default, deserialize_with = "delegated_icx")]
    pub delegated: Decimal,
    #[serde(default)]
    pub name: Option<String>,
}

fn delegated_icx<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.map(|v| scale_hex(&v, EXA)).unwrap_or_default())
}
