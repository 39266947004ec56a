use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

use super::Notifier;
use crate::error::ChannelError;
use crate::types::{ChannelKind, StatusChange};

/// Appends alerts to a per-monitor log file.
pub struct FileNotifier {
    path: PathBuf,
}

impl FileNotifier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_path() -> PathBuf {
        PathBuf::from("monitor_data/alerts.log")
    }
}

#[async_trait]
impl Notifier for FileNotifier {
    fn kind(&self) -> ChannelKind {
        ChannelKind::File
    }

    async fn send(&self, message: &str, change: &StatusChange) -> Result<(), ChannelError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| ChannelError::new(format!("alert log dir: {}", e)))?;
            }
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| ChannelError::new(format!("alert log open: {}", e)))?;

        let entry = format!(
            "{} - {}\n{}\n\n",
            Utc::now().to_rfc3339(),
            change.agent_id,
            message
        );
        file.write_all(entry.as_bytes())
            .await
            .map_err(|e| ChannelError::new(format!("alert log write: {}", e)))?;

        Ok(())
    }
}
