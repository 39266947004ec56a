use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

use super::Notifier;
use crate::error::ChannelError;
use crate::types::{ChannelKind, StatusChange};

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// POSTs a JSON payload to a configured webhook URL.
///
/// With no URL configured the channel is a documented no-op: no network
/// I/O is attempted and no error is reported. The URL is treated as a
/// credential and never logged.
pub struct WebhookNotifier {
    url: Option<String>,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: Option<String>) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Webhook
    }

    async fn send(&self, message: &str, change: &StatusChange) -> Result<(), ChannelError> {
        let Some(url) = &self.url else {
            log::debug!("webhook channel disabled: no URL configured");
            return Ok(());
        };

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ChannelError::new("webhook URL must be HTTP or HTTPS"));
        }

        let payload = json!({
            "agent_id": change.agent_id,
            "previous_status": change.previous_status,
            "new_status": change.new_status,
            "timestamp": change.timestamp.to_rfc3339(),
            "message": message,
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
                "webhook responded with {}",
                response.status()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AgentStatus;

    #[tokio::test]
    async fn test_unconfigured_webhook_is_a_noop() {
        let notifier = WebhookNotifier::new(None);
        let change = StatusChange::new("agent-1", AgentStatus::Running, AgentStatus::Failed);

        // No URL: must succeed without attempting network I/O.
        assert!(notifier.send("alert", &change).await.is_ok());
    }

    #[tokio::test]
    async fn test_non_http_url_is_rejected() {
        let notifier = WebhookNotifier::new(Some("ftp://example.com/hook".to_string()));
        let change = StatusChange::new("agent-1", AgentStatus::Running, AgentStatus::Failed);

        let err = notifier.send("alert", &change).await.unwrap_err();
        assert!(err.reason.contains("HTTP"));
    }
}
