//! Request guards applied in production only.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::AppState;
use crate::error::AppError;

/// htmx marks its own requests with `HX-Request: true`.
pub fn is_htmx_request(headers: &HeaderMap) -> bool {
    headers
        .get("hx-request")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

/// Host header names `localhost`, with or without a port.
pub fn is_localhost(headers: &HeaderMap) -> bool {
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .and_then(|host| host.split(':').next())
        .is_some_and(|name| name.eq_ignore_ascii_case("localhost"))
}

/// Components are fragments; browsing to one directly shows the 404 page.
pub async fn require_htmx(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if state.config.is_production() && !is_htmx_request(request.headers()) {
        tracing::debug!(path = %request.uri().path(), "Rejected non-htmx component request");
        return AppError::NotFound(request.uri().path().to_string()).into_response();
    }
    next.run(request).await
}

/// Sync triggers may only be called from the host itself.
pub async fn require_localhost(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if state.config.is_production() && !is_localhost(request.headers()) {
        tracing::warn!(path = %request.uri().path(), "Rejected non-local sync request");
        return AppError::Unprocessable("sync endpoints are only reachable from localhost".to_string())
            .into_response();
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_is_htmx_request() {
        let mut headers = HeaderMap::new();
        assert!(!is_htmx_request(&headers));
        headers.insert("hx-request", HeaderValue::from_static("TRUE"));
        assert!(is_htmx_request(&headers));
        headers.insert("hx-request", HeaderValue::from_static("false"));
        assert!(!is_htmx_request(&headers));
    }

    #[test]
    fn test_is_localhost() {
        let mut headers = HeaderMap::new();
        assert!(!is_localhost(&headers));
        headers.insert(header::HOST, HeaderValue::from_static("localhost:8000"));
        assert!(is_localhost(&headers));
        headers.insert(header::HOST, HeaderValue::from_static("localhost"));
        assert!(is_localhost(&headers));
        headers.insert(header::HOST, HeaderValue::from_static("tracker.example.org"));
        assert!(!is_localhost(&headers));
        headers.insert(header::HOST, HeaderValue::from_static("localhost.example.org"));
        assert!(!is_localhost(&headers));
        headers.insert(header::HOST, HeaderValue::from_static("localhostile.org:8000"));
        assert!(!is_localhost(&headers));
    }
}
