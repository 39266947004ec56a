use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{AgentId, AgentStatus};

/// A detected status transition for one agent.
///
/// Only constructed when the new status differs from the previous one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChange {
    pub agent_id: AgentId,
    pub previous_status: AgentStatus,
    pub new_status: AgentStatus,
    pub timestamp: DateTime<Utc>,
    pub reason: String,
    /// Fingerprint of `(agent_id, previous_status, new_status)`, used to
    /// deduplicate repeated identical transitions.
    pub change_hash: String,
}

impl StatusChange {
    pub fn new(agent_id: impl Into<AgentId>, previous: AgentStatus, new: AgentStatus) -> Self {
        let agent_id = agent_id.into();
        let change_hash = change_fingerprint(&agent_id, previous, new);
        Self {
            reason: format!("Status change detected: {} -> {}", previous, new),
            agent_id,
            previous_status: previous,
            new_status: new,
            timestamp: Utc::now(),
            change_hash,
        }
    }
}

/// Deterministic digest of an agent-transition triple.
///
/// Depends only on the triple, not on time, so the same transition seen
/// again later maps to the same fingerprint.
pub fn change_fingerprint(agent_id: &str, previous: AgentStatus, new: AgentStatus) -> String {
    let digest = Sha256::digest(format!("{}:{}:{}", agent_id, previous, new));
    format!("{:x}", digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = change_fingerprint("agent-1", AgentStatus::Running, AgentStatus::Failed);
        let b = change_fingerprint("agent-1", AgentStatus::Running, AgentStatus::Failed);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_varies_with_triple() {
        let base = change_fingerprint("agent-1", AgentStatus::Running, AgentStatus::Failed);
        assert_ne!(
            base,
            change_fingerprint("agent-2", AgentStatus::Running, AgentStatus::Failed)
        );
        assert_ne!(
            base,
            change_fingerprint("agent-1", AgentStatus::Pending, AgentStatus::Failed)
        );
        assert_ne!(
            base,
            change_fingerprint("agent-1", AgentStatus::Running, AgentStatus::Timeout)
        );
    }

    #[test]
    fn test_change_carries_reason_and_hash() {
        let change = StatusChange::new("agent-1", AgentStatus::Unknown, AgentStatus::Running);
        assert_eq!(change.previous_status, AgentStatus::Unknown);
        assert_eq!(change.new_status, AgentStatus::Running);
        assert!(change.reason.contains("unknown -> running"));
        assert_eq!(
            change.change_hash,
            change_fingerprint("agent-1", AgentStatus::Unknown, AgentStatus::Running)
        );
    }
}
