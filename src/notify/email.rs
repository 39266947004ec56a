use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

use super::Notifier;
use crate::error::ChannelError;
use crate::types::{ChannelKind, StatusChange};

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Hands the alert to an external mail relay collaborator over HTTP.
/// Message composition beyond subject/body and the actual SMTP transport
/// are the relay's concern. Unconfigured, the channel is a no-op.
pub struct EmailNotifier {
    endpoint: Option<String>,
    client: reqwest::Client,
}

impl EmailNotifier {
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Email
    }

    async fn send(&self, message: &str, change: &StatusChange) -> Result<(), ChannelError> {
        let Some(endpoint) = &self.endpoint else {
            log::debug!("email channel disabled: no relay endpoint configured");
            return Ok(());
        };

        let payload = json!({
            "subject": format!(
                "Agent {} is now {}",
                change.agent_id, change.new_status
            ),
            "body": message,
            "agent_id": change.agent_id,
            "status": change.new_status,
        });

        let response = self
            .client
            .post(endpoint)
            .timeout(DELIVERY_TIMEOUT)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ChannelError::new(format!(
                "mail relay responded with {}",
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
    async fn test_unconfigured_email_is_a_noop() {
        let notifier = EmailNotifier::new(None);
        let change = StatusChange::new("agent-1", AgentStatus::Running, AgentStatus::Failed);

        assert!(notifier.send("alert", &change).await.is_ok());
    }
}
