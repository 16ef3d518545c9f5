//! Thin reqwest wrapper used for every upstream REST call.
//!
//! Failures are logged and swallowed: callers receive `None` and render an
//! empty section instead of an error page.

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, header::HeaderMap};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;

use crate::error::{AppError, AppResult};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_RETRIES: u32 = 2;

#[derive(Clone)]
pub struct HttpReq {
    client: Client,
}

impl Default for HttpReq {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpReq {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent("rhizome-tracker")
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub async fn get(&self, url: &str, headers: Option<HeaderMap>) -> Option<Response> {
        self.get_with(url, headers, DEFAULT_TIMEOUT, DEFAULT_RETRIES)
            .await
    }

    pub async fn get_with(
        &self,
        url: &str,
        headers: Option<HeaderMap>,
        timeout: Duration,
        retries: u32,
    ) -> Option<Response> {
        self.send(Method::GET, url, timeout, retries, |req| match &headers {
            Some(h) => req.headers(h.clone()),
            None => req,
        })
        .await
    }

    /// GET and decode a JSON body. A 404 maps to `NotFound`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        headers: Option<HeaderMap>,
    ) -> AppResult<T> {
        let response = self
            .get(url, headers)
            .await
            .ok_or_else(|| AppError::Unavailable(url.to_string()))?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(AppError::NotFound(url.to_string())),
            status if !status.is_success() => {
                Err(AppError::Unavailable(format!("{} returned {}", url, status)))
            }
            _ => Ok(response.json().await?),
        }
    }

    pub async fn head(&self, url: &str) -> Option<Response> {
        self.head_with(url, DEFAULT_TIMEOUT, DEFAULT_RETRIES).await
    }

    pub async fn head_with(&self, url: &str, timeout: Duration, retries: u32) -> Option<Response> {
        self.send(Method::HEAD, url, timeout, retries, |req| req)
            .await
    }

    pub async fn post<T: Serialize + ?Sized>(&self, url: &str, json: &T) -> Option<Response> {
        self.post_with(url, json, DEFAULT_TIMEOUT, DEFAULT_RETRIES)
            .await
    }

    pub async fn post_with<T: Serialize + ?Sized>(
        &self,
        url: &str,
        json: &T,
        timeout: Duration,
        retries: u32,
    ) -> Option<Response> {
        self.send(Method::POST, url, timeout, retries, |req| req.json(json))
            .await
    }

    /// Sends a request, retrying only when the connection itself fails.
    async fn send<F>(
        &self,
        method: Method,
        url: &str,
        timeout: Duration,
        retries: u32,
        build: F,
    ) -> Option<Response>
    where
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            let request = build(self.client.request(method.clone(), url).timeout(timeout));
            match request.send().await {
                Ok(response) => {
                    if !response.status().is_success() {
                        tracing::debug!(%url, status = %response.status(), "Upstream returned non-success status");
                    }
                    return Some(response);
                }
                Err(e) if e.is_connect() && attempt < retries => {
                    attempt += 1;
                    tracing::debug!(%url, attempt, "Connection failed, retrying");
                }
                Err(e) => {
                    tracing::warn!(%url, error = %e, "Upstream request failed");
                    return None;
                }
            }
        }
    }
}

/// Reads the `x-total-count` header used by the tracker API for totals.
pub fn total_count(response: &Response) -> Option<u64> {
    response
        .headers()
        .get("x-total-count")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}
