use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

use super::Notifier;
use crate::error::ChannelError;
use crate::types::{ChannelKind, StatusChange};

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);
const SMS_TEXT_LIMIT: usize = 160;

/// Hands the alert to an external SMS gateway collaborator over HTTP,
/// truncating the text to a single message segment. Unconfigured, the
/// channel is a no-op.
pub struct SmsNotifier {
    endpoint: Option<String>,
    client: reqwest::Client,
}

impl SmsNotifier {
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
        }
    }
}

fn segment(change: &StatusChange) -> String {
    let mut text = format!(
        "Agent {}: {} -> {}",
        change.agent_id, change.previous_status, change.new_status
    );
    text.truncate(SMS_TEXT_LIMIT);
    text
}

#[async_trait]
impl Notifier for SmsNotifier {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Sms
    }

    async fn send(&self, _message: &str, change: &StatusChange) -> Result<(), ChannelError> {
        let Some(endpoint) = &self.endpoint else {
            log::debug!("sms channel disabled: no gateway endpoint configured");
            return Ok(());
        };

        let payload = json!({
            "agent_id": change.agent_id,
            "status": change.new_status,
            "text": segment(change),
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
                "sms gateway responded with {}",
                response.status()
            )));
        }

        Ok(())
    }
}
