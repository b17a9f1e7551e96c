use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::NotificationSender;

#[derive(Debug, Serialize)]
struct PushRequest<'a> {
    to: &'a str,
    messages: [TextMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct TextMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct PushError {
    #[serde(default)]
    message: Option<String>,
}

/// Pushes text messages through the LINE Messaging API.
pub struct LinePushSender {
    client: reqwest::Client,
    push_url: String,
    channel_access_token: Option<String>,
}

impl LinePushSender {
    pub fn new(push_url: String, channel_access_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            push_url,
            channel_access_token: channel_access_token.filter(|t| !t.is_empty()),
        }
    }
}

#[async_trait]
impl NotificationSender for LinePushSender {
    async fn send(&self, user_id: &str, message: &str) -> Result<(), String> {
        let Some(token) = &self.channel_access_token else {
            return Err("LINE channel access token is not configured".to_string());
        };

        let body = PushRequest {
            to: user_id,
            messages: [TextMessage {
                kind: "text",
                text: message,
            }],
        };

        let resp = self
            .client
            .post(&self.push_url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !resp.status().is_success() {
            let status = resp.status();
            let reason = resp
                .json::<PushError>()
                .await
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| format!("push failed with status {status}"));
            return Err(reason);
        }

        Ok(())
    }
}
