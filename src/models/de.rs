//! Serde helpers for upstream payloads that mix JSON numbers, hex strings and
//! empty strings for the same field.

use serde::{Deserialize, Deserializer, de::Error};
use serde_json::Value;

use crate::utils::parse_number;

fn value_to_i128(value: &Value) -> Option<i128> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from))
            .or_else(|| n.as_f64().map(|f| f as i128)),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

pub fn flexible_i128<'de, D>(deserializer: D) -> Result<i128, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match &value {
        Value::Null => Ok(0),
        Value::String(s) if s.is_empty() => Ok(0),
        _ => value_to_i128(&value)
            .ok_or_else(|| D::Error::custom(format!("expected integer, got {}", value))),
    }
}

pub fn flexible_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    flexible_i128(deserializer).map(|v| v as i64)
}

pub fn flexible_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    flexible_i128(deserializer).map(|v| v.max(0) as u64)
}

pub fn optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_i128).map(|v| v as i64))
}

/// Empty strings become `None`.
pub fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
