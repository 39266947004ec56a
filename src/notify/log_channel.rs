use async_trait::async_trait;

use super::Notifier;
use crate::error::ChannelError;
use crate::types::{ChannelKind, StatusChange};

/// Writes alerts to the process log. Failed/Timeout targets log at warn
/// level, everything else at info.
#[derive(Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Log
    }

    async fn send(&self, message: &str, change: &StatusChange) -> Result<(), ChannelError> {
        if change.new_status.is_alarming() {
            log::warn!("ALERT: {}", message);
        } else {
            log::info!("ALERT: {}", message);
        }
        Ok(())
    }
}
