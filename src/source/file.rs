use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::StatusSource;
use crate::error::FetchError;
use crate::types::AgentStatusSnapshot;

/// Reads agent snapshots from `<agent_id>_status.json` files in a
/// directory. Agents write (or have written for them) one JSON file each;
/// the monitor only ever reads.
pub struct FileStatusSource {
    dir: PathBuf,
}

impl FileStatusSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn status_path(&self, agent_id: &str) -> PathBuf {
        self.dir.join(format!("{}_status.json", agent_id))
    }
}

#[async_trait]
impl StatusSource for FileStatusSource {
    async fn fetch(&self, agent_id: &str) -> Result<AgentStatusSnapshot, FetchError> {
        let path = self.status_path(agent_id);
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| FetchError::new(agent_id, format!("status file unreadable: {}", e)))?;

        let snapshot: AgentStatusSnapshot = serde_json::from_str(&raw)
            .map_err(|e| FetchError::new(agent_id, format!("status file malformed: {}", e)))?;

        if snapshot.agent_id != agent_id {
            return Err(FetchError::new(
                agent_id,
                format!("status file reports agent {}", snapshot.agent_id),
            ));
        }

        Ok(snapshot)
    }
}
