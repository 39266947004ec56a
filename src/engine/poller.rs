use chrono::{Duration, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::notify::Dispatcher;
use crate::source::StatusSource;
use crate::state::MonitorState;
use crate::types::{AgentId, AgentStatusSnapshot, StatusChange};

/// Runs poll cycles: fetch each agent's snapshot, detect transitions,
/// deduplicate, record, and dispatch notifications.
pub struct PollEngine {
    source: Arc<dyn StatusSource>,
    dispatcher: Arc<Dispatcher>,
    state: Arc<MonitorState>,
    retention: Duration,
    /// Held for the duration of a cycle; the scheduler try-acquires it so
    /// an overlapping trigger is skipped rather than queued.
    cycle_gate: Mutex<()>,
}

impl PollEngine {
    pub fn new(
        source: Arc<dyn StatusSource>,
        dispatcher: Arc<Dispatcher>,
        state: Arc<MonitorState>,
        retention_days: i64,
    ) -> Self {
        Self {
            source,
            dispatcher,
            state,
            retention: Duration::days(retention_days.max(0)),
            cycle_gate: Mutex::new(()),
        }
    }

    /// Run one poll cycle, waiting if another cycle is in flight.
    /// Returns the newly detected (non-duplicate) changes.
    pub async fn poll_cycle(&self, agent_ids: &[AgentId]) -> Vec<StatusChange> {
        let _gate = self.cycle_gate.lock().await;
        self.run_cycle(agent_ids).await
    }

    /// Run one poll cycle only if no cycle is currently in flight.
    /// Returns `None` when the gate is held (the trigger is skipped).
    pub async fn try_poll_cycle(&self, agent_ids: &[AgentId]) -> Option<Vec<StatusChange>> {
        let _gate = self.cycle_gate.try_lock().ok()?;
        Some(self.run_cycle(agent_ids).await)
    }

    async fn run_cycle(&self, agent_ids: &[AgentId]) -> Vec<StatusChange> {
        if self.retention > Duration::zero() {
            self.state.prune_older_than(Utc::now() - self.retention);
        }

        let mut emitted = Vec::new();

        for agent_id in agent_ids {
            match self.source.fetch(agent_id).await {
                Ok(snapshot) => {
                    if let Some(change) = self.apply_snapshot(snapshot).await {
                        emitted.push(change);
                    }
                }
                // One agent's failure never aborts the rest of the cycle;
                // its prior status is retained.
                Err(e) => log::warn!("{}", e),
            }
        }

        if !emitted.is_empty() {
            log::debug!("poll cycle detected {} new changes", emitted.len());
        }

        emitted
    }

    /// Compare a fresh snapshot with the agent's last-known status, emit a
    /// deduplicated change when they differ, and record the observation.
    async fn apply_snapshot(&self, snapshot: AgentStatusSnapshot) -> Option<StatusChange> {
        let previous = self.state.current_snapshot(&snapshot.agent_id);
        let mut emitted = None;

        if let Some(previous) = previous {
            if previous.status != snapshot.status {
                let change =
                    StatusChange::new(snapshot.agent_id.clone(), previous.status, snapshot.status);

                if self
                    .state
                    .dedup
                    .insert_novel(&change.change_hash, change.timestamp)
                {
                    // Recorded before dispatch so a delivered notification
                    // is always retrievable from history.
                    self.state.record_change(change.clone());
                    self.dispatcher.dispatch(&change, &snapshot).await;
                    emitted = Some(change);
                }
            }
        }

        self.state.record_snapshot(snapshot);
        emitted
    }
}
