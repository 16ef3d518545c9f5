use serde_json::json;

use crate::services::http_request::HttpReq;

/// Posts sync notifications to a Discord webhook. Without a webhook URL
/// messages are only logged.
#[derive(Clone)]
pub struct DiscordNotifier {
    http: HttpReq,
    webhook_url: Option<String>,
}

impl DiscordNotifier {
    pub fn new(http: HttpReq, webhook_url: Option<String>) -> Self {
        Self { http, webhook_url }
    }

    /// Returns whether the webhook accepted the message.
    pub async fn send(&self, message: &str) -> bool {
        let Some(url) = &self.webhook_url else {
            tracing::debug!(%message, "Discord webhook not configured");
            return false;
        };
        match self.http.post(url, &json!({ "content": message })).await {
            Some(response) if response.status().is_success() => true,
            Some(response) => {
                tracing::warn!(status = %response.status(), "Discord webhook rejected notification");
                false
            }
            None => false,
        }
    }
}
