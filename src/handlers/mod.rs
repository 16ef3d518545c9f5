//! Route handlers: full pages, htmx components, and the JSON API.

pub mod address;
pub mod api;
pub mod balanced;
pub mod build;
pub mod chain;
pub mod database;
pub mod governance;
pub mod guards;
pub mod pages;

use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// `?page=&limit=&refresh=` shared by the paginated tables.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    pub limit: Option<u64>,
    #[serde(default = "default_refresh")]
    pub refresh: bool,
}

fn default_page() -> u64 {
    1
}

fn default_refresh() -> bool {
    true
}

impl PageQuery {
    /// Page and limit checked against `min..=max` (no upper bound when `max` is `None`).
    pub fn validated(&self, default_limit: u64, min: u64, max: Option<u64>) -> AppResult<(u64, u64)> {
        if self.page < 1 {
            return Err(AppError::Unprocessable("page must be at least 1".to_string()));
        }
        let limit = self.limit.unwrap_or(default_limit);
        if limit < min || max.is_some_and(|max| limit > max) {
            return Err(AppError::Unprocessable(match max {
                Some(max) => format!("limit must be between {} and {}", min, max),
                None => format!("limit must be at least {}", min),
            }));
        }
        Ok((self.page, limit))
    }
}

/// Logs a failed upstream read and falls back to an empty value, so the
/// fragment renders as an empty section.
pub(crate) fn or_empty<T: Default>(result: AppResult<T>, what: &str) -> T {
    result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "{} unavailable", what);
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: u64, limit: Option<u64>) -> PageQuery {
        PageQuery {
            page,
            limit,
            refresh: true,
        }
    }

    #[test]
    fn test_page_query_bounds() {
        assert_eq!(query(1, None).validated(50, 25, Some(100)).unwrap(), (1, 50));
        assert_eq!(query(3, Some(25)).validated(50, 25, Some(100)).unwrap(), (3, 25));
        assert!(query(0, None).validated(50, 25, Some(100)).is_err());
        assert!(query(1, Some(101)).validated(50, 25, Some(100)).is_err());
        assert!(query(1, Some(10)).validated(100, 25, None).is_err());
        assert_eq!(query(1, Some(500)).validated(100, 25, None).unwrap(), (1, 500));
    }

    #[test]
    fn test_or_empty() {
        let failed: AppResult<Vec<u8>> = Err(AppError::Unavailable("x".to_string()));
        assert!(or_empty(failed, "test").is_empty());
        assert_eq!(or_empty(Ok(vec![1u8]), "test"), vec![1]);
    }
}
