use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

use super::Notifier;
use crate::error::ChannelError;
use crate::types::{ChannelKind, StatusChange};

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts an attachment-formatted message to a Slack incoming webhook.
/// Unconfigured, it is a no-op like the generic webhook channel.
pub struct SlackNotifier {
    webhook_url: Option<String>,
    client: reqwest::Client,
}

impl SlackNotifier {
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            webhook_url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Slack
    }

    async fn send(&self, message: &str, change: &StatusChange) -> Result<(), ChannelError> {
        let Some(url) = &self.webhook_url else {
            log::debug!("slack channel disabled: no webhook URL configured");
            return Ok(());
        };

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ChannelError::new("slack webhook URL must be HTTP or HTTPS"));
        }

        let color = if change.new_status.is_alarming() {
            "danger"
        } else {
            "good"
        };
        let payload = json!({
            "attachments": [{
                "color": color,
                "title": format!("Agent {} Status Update", change.agent_id),
                "text": message,
                "ts": change.timestamp.timestamp(),
            }]
        });

        let response = self
            .client
            .post(url)
            .timeout(DELIVERY_TIMEOUT)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ChannelError::new(format!(
                "slack webhook responded with {}",
                response.status()
            )));
        }

        Ok(())
    }
}
