use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::{AgentId, AgentStatus};

/// One immutable observation of an agent at an instant.
///
/// A new observation always produces a new snapshot; existing snapshots are
/// never mutated in place. Exactly one snapshot is current per agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStatusSnapshot {
    pub agent_id: AgentId,
    pub status: AgentStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub details: HashMap<String, Value>,
    #[serde(default)]
    pub error_message: Option<String>,
    /// Informational only, 0-100. External status documents may carry
    /// anything a u8 holds; values above 100 clamp on deserialize.
    #[serde(default, deserialize_with = "deserialize_percentage")]
    pub completion_percentage: u8,
    #[serde(default)]
    pub session_id: Option<String>,
}

fn deserialize_percentage<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = u8::deserialize(deserializer)?;
    Ok(value.min(100))
}

impl AgentStatusSnapshot {
    pub fn new(agent_id: impl Into<AgentId>, status: AgentStatus) -> Self {
        Self {
            agent_id: agent_id.into(),
            status,
            timestamp: Utc::now(),
            details: HashMap::new(),
            error_message: None,
            completion_percentage: 0,
            session_id: None,
        }
    }

    /// Seed snapshot used when an agent is first registered, before any
    /// real observation has been made.
    pub fn unknown(agent_id: impl Into<AgentId>) -> Self {
        Self::new(agent_id, AgentStatus::Unknown)
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn with_progress(mut self, percentage: u8) -> Self {
        self.completion_percentage = percentage.min(100);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_seed_snapshot() {
        let snapshot = AgentStatusSnapshot::unknown("agent-1");
        assert_eq!(snapshot.agent_id, "agent-1");
        assert_eq!(snapshot.status, AgentStatus::Unknown);
        assert!(snapshot.details.is_empty());
        assert!(snapshot.error_message.is_none());
        assert_eq!(snapshot.completion_percentage, 0);
    }

    #[test]
    fn test_progress_is_clamped() {
        let snapshot = AgentStatusSnapshot::new("agent-1", AgentStatus::Running).with_progress(250);
        assert_eq!(snapshot.completion_percentage, 100);
    }

    #[test]
    fn test_out_of_range_progress_clamps_on_deserialize() {
        let raw = r#"{
            "agent_id": "worker-3",
            "status": "running",
            "timestamp": "2026-01-10T08:30:00Z",
            "completion_percentage": 250
        }"#;
        let snapshot: AgentStatusSnapshot = serde_json::from_str(raw).unwrap();
        assert_eq!(snapshot.completion_percentage, 100);
    }

    #[test]
    fn test_deserializes_with_missing_optional_fields() {
        let raw = r#"{
            "agent_id": "worker-3",
            "status": "running",
            "timestamp": "2026-01-10T08:30:00Z"
        }"#;
        let snapshot: AgentStatusSnapshot = serde_json::from_str(raw).unwrap();
        assert_eq!(snapshot.status, AgentStatus::Running);
        assert!(snapshot.session_id.is_none());
    }
}
