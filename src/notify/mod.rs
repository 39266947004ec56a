pub mod email;
pub mod file;
pub mod log_channel;
pub mod slack;
pub mod sms;
pub mod webhook;

pub use email::EmailNotifier;
pub use file::FileNotifier;
pub use log_channel::LogNotifier;
pub use slack::SlackNotifier;
pub use sms::SmsNotifier;
pub use webhook::WebhookNotifier;

use async_trait::async_trait;
use std::collections::HashMap;

use crate::config::MonitorConfig;
use crate::error::ChannelError;
use crate::types::{AgentStatusSnapshot, ChannelKind, StatusChange};

/// One delivery channel. Implementations report failure as a value, never
/// by panicking, so the dispatcher can continue to the next channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn kind(&self) -> ChannelKind;

    async fn send(&self, message: &str, change: &StatusChange) -> Result<(), ChannelError>;
}

/// Fans a status change out to every configured channel.
///
/// Channels are bound once at configuration time, keyed by kind. Failures
/// are isolated per channel: each is logged with the channel name and the
/// remaining channels are still attempted. Endpoint values never appear in
/// the log output.
pub struct Dispatcher {
    channels: HashMap<ChannelKind, Box<dyn Notifier>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            channels: HashMap::new(),
        }
    }

    /// Bind the notifiers named by the configuration.
    pub fn from_config(config: &MonitorConfig) -> Self {
        let settings = &config.channel_settings;
        let mut dispatcher = Self::new();

        for kind in &config.channels {
            let notifier: Box<dyn Notifier> = match kind {
                ChannelKind::Log => Box::new(LogNotifier::new()),
                ChannelKind::File => Box::new(FileNotifier::new(
                    settings
                        .alert_file
                        .clone()
                        .unwrap_or_else(FileNotifier::default_path),
                )),
                ChannelKind::Webhook => Box::new(WebhookNotifier::new(settings.webhook_url.clone())),
                ChannelKind::Slack => Box::new(SlackNotifier::new(settings.slack_webhook_url.clone())),
                ChannelKind::Email => Box::new(EmailNotifier::new(settings.email_endpoint.clone())),
                ChannelKind::Sms => Box::new(SmsNotifier::new(settings.sms_endpoint.clone())),
            };
            dispatcher = dispatcher.with_channel(notifier);
        }

        dispatcher
    }

    pub fn with_channel(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.channels.insert(notifier.kind(), notifier);
        self
    }

    pub fn channel_kinds(&self) -> Vec<ChannelKind> {
        self.channels.keys().copied().collect()
    }

    /// Deliver one formatted message for `change` to every channel.
    /// Returns the number of channels that reported success.
    pub async fn dispatch(&self, change: &StatusChange, snapshot: &AgentStatusSnapshot) -> usize {
        let message = format_notification(change, snapshot);
        let mut delivered = 0;

        for (kind, notifier) in &self.channels {
            match notifier.send(&message, change).await {
                Ok(()) => {
                    delivered += 1;
                    log::debug!("notification delivered via {}", kind);
                }
                Err(e) => {
                    log::error!("notification via {} failed: {}", kind, e);
                }
            }
        }

        delivered
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Single human-readable message shared by every channel.
pub fn format_notification(change: &StatusChange, snapshot: &AgentStatusSnapshot) -> String {
    let details = if snapshot.details.is_empty() {
        "None".to_string()
    } else {
        serde_json::to_string(&snapshot.details).unwrap_or_else(|_| "None".to_string())
    };

    format!(
        "Agent Status Update\n\
         Agent ID: {}\n\
         Previous Status: {}\n\
         New Status: {}\n\
         Timestamp: {}\n\
         Reason: {}\n\
         Details: {}\n\
         Error: {}\n\
         Progress: {}%",
        change.agent_id,
        change.previous_status,
        change.new_status,
        change.timestamp.to_rfc3339(),
        change.reason,
        details,
        snapshot.error_message.as_deref().unwrap_or("None"),
        snapshot.completion_percentage,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AgentStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct RecordingNotifier {
        kind: ChannelKind,
        sent: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        fn kind(&self) -> ChannelKind {
            self.kind
        }

        async fn send(&self, _message: &str, _change: &StatusChange) -> Result<(), ChannelError> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        fn kind(&self) -> ChannelKind {
            ChannelKind::Webhook
        }

        async fn send(&self, _message: &str, _change: &StatusChange) -> Result<(), ChannelError> {
            Err(ChannelError::new("collaborator unavailable"))
        }
    }

    fn sample_change() -> StatusChange {
        StatusChange::new("agent-1", AgentStatus::Running, AgentStatus::Failed)
    }

    fn sample_snapshot() -> AgentStatusSnapshot {
        AgentStatusSnapshot::new("agent-1", AgentStatus::Failed)
            .with_error("process exited with code 1")
            .with_progress(80)
    }

    #[tokio::test]
    async fn test_failing_channel_does_not_block_others() {
        let sent = Arc::new(AtomicUsize::new(0));
        let dispatcher = Dispatcher::new()
            .with_channel(Box::new(FailingNotifier))
            .with_channel(Box::new(RecordingNotifier {
                kind: ChannelKind::Log,
                sent: sent.clone(),
            }));

        let delivered = dispatcher.dispatch(&sample_change(), &sample_snapshot()).await;

        assert_eq!(delivered, 1);
        assert_eq!(sent.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_all_channels_receive_the_change() {
        let sent = Arc::new(AtomicUsize::new(0));
        let dispatcher = Dispatcher::new()
            .with_channel(Box::new(RecordingNotifier {
                kind: ChannelKind::Log,
                sent: sent.clone(),
            }))
            .with_channel(Box::new(RecordingNotifier {
                kind: ChannelKind::File,
                sent: sent.clone(),
            }));

        let delivered = dispatcher.dispatch(&sample_change(), &sample_snapshot()).await;

        assert_eq!(delivered, 2);
        assert_eq!(sent.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_message_format_carries_change_and_snapshot_fields() {
        let message = format_notification(&sample_change(), &sample_snapshot());

        assert!(message.contains("Agent ID: agent-1"));
        assert!(message.contains("Previous Status: running"));
        assert!(message.contains("New Status: failed"));
        assert!(message.contains("process exited with code 1"));
        assert!(message.contains("Progress: 80%"));
    }

    #[test]
    fn test_from_config_binds_configured_channels() {
        let config = MonitorConfig {
            channels: vec![ChannelKind::Log, ChannelKind::Webhook],
            ..MonitorConfig::default()
        };
        let dispatcher = Dispatcher::from_config(&config);

        let mut kinds = dispatcher.channel_kinds();
        kinds.sort_by_key(|k| k.as_str());
        assert_eq!(kinds, vec![ChannelKind::Log, ChannelKind::Webhook]);
    }
}
