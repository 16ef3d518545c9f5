//! `{default, formatted}` pairs handed to the views.

use chrono::{NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use crate::utils::{format_number, format_percentage, micros_to_datetime, to_relative_time};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Formatted<T> {
    pub default: T,
    pub formatted: String,
}

impl Formatted<Decimal> {
    pub fn number(value: Decimal) -> Self {
        Self::number_with(value, 4, false)
    }

    pub fn number_with(value: Decimal, precision: u32, display_sign: bool) -> Self {
        Self {
            formatted: format_number(value, precision, display_sign),
            default: value,
        }
    }

    pub fn percentage(value: Decimal) -> Self {
        Self::percentage_with(value, false)
    }

    pub fn percentage_with(value: Decimal, display_sign: bool) -> Self {
        Self {
            formatted: format_percentage(value, 2, display_sign),
            default: value,
        }
    }
}

impl Formatted<i64> {
    pub fn count(value: i64) -> Self {
        Self {
            formatted: format_number(Decimal::from(value), 4, false),
            default: value,
        }
    }
}

/// A tracker timestamp (microseconds) reduced to seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timestamp {
    pub default: i64,
    pub formatted: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative: Option<String>,
}

impl Timestamp {
    pub fn from_micros(timestamp_us: i64) -> Self {
        Self {
            default: timestamp_us / 1_000_000,
            formatted: micros_to_datetime(timestamp_us),
            relative: None,
        }
    }

    pub fn with_relative(mut self) -> Self {
        self.relative = Some(to_relative_time(
            self.formatted,
            Utc::now().naive_utc(),
            true,
        ));
        self
    }
}

/// JSON carried as a string by the tracker API, decoded and pretty-printed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonData {
    pub default: Option<Value>,
    pub formatted: Option<String>,
}

impl JsonData {
    pub fn parse(raw: &str, pretty: bool) -> Self {
        if raw.is_empty() {
            return Self {
                default: None,
                formatted: None,
            };
        }
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => {
                let formatted = if pretty {
                    serde_json::to_string_pretty(&value)
                } else {
                    serde_json::to_string(&value)
                }
                .ok();
                Self {
                    default: Some(value),
                    formatted,
                }
            }
            Err(_) => Self {
                default: Some(Value::String(raw.to_string())),
                formatted: Some(raw.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_formatted_number() {
        let f = Formatted::number(dec!(1234.5));
        assert_eq!(f.default, dec!(1234.5));
        assert_eq!(f.formatted, "1,234.5");
        assert_eq!(Formatted::count(1000).formatted, "1,000");
    }

    #[test]
    fn test_timestamp_from_micros() {
        let ts = Timestamp::from_micros(1_650_000_000_123_456);
        assert_eq!(ts.default, 1_650_000_000);
        assert_eq!(ts.formatted.to_string(), "2022-04-15 05:20:00");
    }

    #[test]
    fn test_json_data() {
        let data = JsonData::parse(r#"{"method":"transfer"}"#, false);
        assert_eq!(data.formatted.as_deref(), Some(r#"{"method":"transfer"}"#));
        assert!(JsonData::parse("", true).default.is_none());
    }
}
