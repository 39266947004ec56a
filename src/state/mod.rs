pub mod dedup;

pub use dedup::DedupCache;

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

use crate::types::{AgentId, AgentStatusSnapshot, StatusChange};

/// Process-wide state owned by one running monitor instance.
///
/// Mutated only from poll-cycle execution; external queries take reader
/// locks and return owned copies. Nothing here is persisted — a restart
/// loses all history.
pub struct MonitorState {
    current: RwLock<HashMap<AgentId, AgentStatusSnapshot>>,
    history: RwLock<HashMap<AgentId, Vec<AgentStatusSnapshot>>>,
    changes: RwLock<HashMap<AgentId, Vec<StatusChange>>>,
    last_poll: RwLock<HashMap<AgentId, DateTime<Utc>>>,
    pub dedup: DedupCache,
}

impl MonitorState {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(HashMap::new()),
            history: RwLock::new(HashMap::new()),
            changes: RwLock::new(HashMap::new()),
            last_poll: RwLock::new(HashMap::new()),
            dedup: DedupCache::new(),
        }
    }

    /// Seed tracking for an agent: an `Unknown` current snapshot and empty
    /// history/changes. Registering an already-known agent is a no-op so a
    /// monitoring restart never disturbs existing state.
    pub fn register_agent(&self, agent_id: &str) {
        let mut current = self.current.write().unwrap();
        if current.contains_key(agent_id) {
            return;
        }
        current.insert(
            agent_id.to_string(),
            AgentStatusSnapshot::unknown(agent_id),
        );
        self.history
            .write()
            .unwrap()
            .insert(agent_id.to_string(), Vec::new());
        self.changes
            .write()
            .unwrap()
            .insert(agent_id.to_string(), Vec::new());
    }

    pub fn is_registered(&self, agent_id: &str) -> bool {
        self.current.read().unwrap().contains_key(agent_id)
    }

    pub fn current_snapshot(&self, agent_id: &str) -> Option<AgentStatusSnapshot> {
        self.current.read().unwrap().get(agent_id).cloned()
    }

    /// Apply a fresh observation: replace the current snapshot, append it
    /// to the agent's history, and stamp the poll time.
    pub fn record_snapshot(&self, snapshot: AgentStatusSnapshot) {
        let agent_id = snapshot.agent_id.clone();
        self.history
            .write()
            .unwrap()
            .entry(agent_id.clone())
            .or_default()
            .push(snapshot.clone());
        self.current
            .write()
            .unwrap()
            .insert(agent_id.clone(), snapshot);
        self.last_poll
            .write()
            .unwrap()
            .insert(agent_id, Utc::now());
    }

    pub fn record_change(&self, change: StatusChange) {
        self.changes
            .write()
            .unwrap()
            .entry(change.agent_id.clone())
            .or_default()
            .push(change);
    }

    /// Last `limit` changes for an agent, oldest first.
    pub fn recent_changes(&self, agent_id: &str, limit: usize) -> Vec<StatusChange> {
        let changes = self.changes.read().unwrap();
        match changes.get(agent_id) {
            Some(list) => list[list.len().saturating_sub(limit)..].to_vec(),
            None => Vec::new(),
        }
    }

    /// Last `limit` snapshots for an agent, oldest first.
    pub fn history(&self, agent_id: &str, limit: usize) -> Vec<AgentStatusSnapshot> {
        let history = self.history.read().unwrap();
        match history.get(agent_id) {
            Some(list) => list[list.len().saturating_sub(limit)..].to_vec(),
            None => Vec::new(),
        }
    }

    pub fn history_len(&self, agent_id: &str) -> usize {
        self.history
            .read()
            .unwrap()
            .get(agent_id)
            .map(|list| list.len())
            .unwrap_or(0)
    }

    pub fn last_poll_time(&self, agent_id: &str) -> Option<DateTime<Utc>> {
        self.last_poll.read().unwrap().get(agent_id).copied()
    }

    /// Retention compaction: drop snapshots, changes, and dedup
    /// fingerprints older than `cutoff`. Current snapshots and poll times
    /// are kept regardless of age.
    pub fn prune_older_than(&self, cutoff: DateTime<Utc>) {
        for list in self.history.write().unwrap().values_mut() {
            list.retain(|s| s.timestamp >= cutoff);
        }
        for list in self.changes.write().unwrap().values_mut() {
            list.retain(|c| c.timestamp >= cutoff);
        }
        let expired = self.dedup.prune_older_than(cutoff);
        if expired > 0 {
            log::debug!("expired {} dedup fingerprints", expired);
        }
    }
}

impl Default for MonitorState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AgentStatus;
    use chrono::Duration;

    #[test]
    fn test_register_seeds_unknown_with_empty_history() {
        let state = MonitorState::new();
        state.register_agent("agent-1");

        let current = state.current_snapshot("agent-1").unwrap();
        assert_eq!(current.status, AgentStatus::Unknown);
        assert_eq!(state.history_len("agent-1"), 0);
        assert!(state.recent_changes("agent-1", 5).is_empty());
    }

    #[test]
    fn test_register_twice_preserves_state() {
        let state = MonitorState::new();
        state.register_agent("agent-1");
        state.record_snapshot(AgentStatusSnapshot::new("agent-1", AgentStatus::Running));

        state.register_agent("agent-1");

        let current = state.current_snapshot("agent-1").unwrap();
        assert_eq!(current.status, AgentStatus::Running);
        assert_eq!(state.history_len("agent-1"), 1);
    }

    #[test]
    fn test_record_snapshot_updates_current_and_appends() {
        let state = MonitorState::new();
        state.register_agent("agent-1");

        state.record_snapshot(AgentStatusSnapshot::new("agent-1", AgentStatus::Running));
        state.record_snapshot(AgentStatusSnapshot::new("agent-1", AgentStatus::Completed));

        assert_eq!(
            state.current_snapshot("agent-1").unwrap().status,
            AgentStatus::Completed
        );
        assert_eq!(state.history_len("agent-1"), 2);
        assert!(state.last_poll_time("agent-1").is_some());

        let history = state.history("agent-1", 100);
        assert_eq!(history[0].status, AgentStatus::Running);
        assert_eq!(history[1].status, AgentStatus::Completed);
    }

    #[test]
    fn test_recent_changes_returns_last_n_in_order() {
        let state = MonitorState::new();
        state.register_agent("agent-1");

        state.record_change(StatusChange::new(
            "agent-1",
            AgentStatus::Unknown,
            AgentStatus::Pending,
        ));
        state.record_change(StatusChange::new(
            "agent-1",
            AgentStatus::Pending,
            AgentStatus::Running,
        ));
        state.record_change(StatusChange::new(
            "agent-1",
            AgentStatus::Running,
            AgentStatus::Completed,
        ));

        let recent = state.recent_changes("agent-1", 2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].new_status, AgentStatus::Running);
        assert_eq!(recent[1].new_status, AgentStatus::Completed);
    }

    #[test]
    fn test_prune_drops_entries_outside_retention() {
        let state = MonitorState::new();
        state.register_agent("agent-1");

        let mut old = AgentStatusSnapshot::new("agent-1", AgentStatus::Running);
        old.timestamp = Utc::now() - Duration::days(10);
        state.record_snapshot(old);
        state.record_snapshot(AgentStatusSnapshot::new("agent-1", AgentStatus::Completed));

        let mut old_change = StatusChange::new("agent-1", AgentStatus::Unknown, AgentStatus::Running);
        old_change.timestamp = Utc::now() - Duration::days(10);
        state.record_change(old_change);

        state.prune_older_than(Utc::now() - Duration::days(7));

        assert_eq!(state.history_len("agent-1"), 1);
        assert!(state.recent_changes("agent-1", 10).is_empty());
        // The current snapshot survives compaction.
        assert!(state.current_snapshot("agent-1").is_some());
    }
}
