//! Local upstream stand-ins for unit tests.

use axum::{Json, Router, routing::post};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::net::TcpListener;

/// Serves `app` on an ephemeral port and returns its base URL.
pub async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// JSON-RPC endpoint at `/api/v3` answering with `handler(request_body)`.
/// Also returns a hit counter.
pub async fn rpc_server<F>(handler: F) -> (String, Arc<AtomicUsize>)
where
    F: Fn(Value) -> Value + Clone + Send + Sync + 'static,
{
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
        "/api/v3",
        post(move |Json(body): Json<Value>| {
            let handler = handler.clone();
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Json(handler(body))
            }
        }),
    );
    (serve(app).await, hits)
}

pub fn rpc_result(result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": 1, "result": result })
}

/// `data.method` of an `icx_call` request body.
pub fn call_method(body: &Value) -> &str {
    body["params"]["data"]["method"].as_str().unwrap_or_default()
}
