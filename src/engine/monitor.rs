use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use super::poller::PollEngine;
use super::schedule::Schedule;
use super::scheduler::Scheduler;
use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::notify::Dispatcher;
use crate::source::StatusSource;
use crate::state::MonitorState;
use crate::types::{AgentId, AgentStatus, AgentStatusSnapshot, ChannelKind, StatusChange};

/// Lifecycle of a monitor instance. No terminal state exists while the
/// process runs; a stopped monitor can be started again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorPhase {
    Idle,
    Monitoring,
    Stopped,
}

/// Passive polling-based monitor for externally managed agents.
///
/// Observes agent status through a `StatusSource`, detects transitions,
/// and fans deduplicated notifications out through the dispatcher. Owns
/// its whole lifecycle: create, start, stop, discard.
pub struct AgentMonitor {
    config: MonitorConfig,
    engine: Arc<PollEngine>,
    scheduler: Scheduler,
    state: Arc<MonitorState>,
    agents: Arc<RwLock<BTreeSet<AgentId>>>,
    phase: RwLock<MonitorPhase>,
}

impl AgentMonitor {
    pub fn new(config: MonitorConfig, source: Arc<dyn StatusSource>) -> Self {
        let dispatcher = Arc::new(Dispatcher::from_config(&config));
        Self::with_dispatcher(config, source, dispatcher)
    }

    /// Construct with an explicit dispatcher, for callers that bind their
    /// own `Notifier` implementations.
    pub fn with_dispatcher(
        config: MonitorConfig,
        source: Arc<dyn StatusSource>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        let state = Arc::new(MonitorState::new());
        let engine = Arc::new(PollEngine::new(
            source,
            dispatcher,
            state.clone(),
            config.retention_days,
        ));

        Self {
            config,
            engine,
            scheduler: Scheduler::new(),
            state,
            agents: Arc::new(RwLock::new(BTreeSet::new())),
            phase: RwLock::new(MonitorPhase::Idle),
        }
    }

    /// Start (or extend) monitoring for the given agents.
    ///
    /// New agents are merged into the monitored set without disturbing
    /// state already accumulated for known agents. One synchronous poll
    /// cycle runs immediately; afterwards, if a schedule spec was given
    /// and scheduling is enabled, the background scheduler is armed
    /// (replacing any previous schedule). A bad schedule spec is surfaced
    /// in the result's `scheduling_error` field, not as an `Err`.
    pub async fn start_monitoring(
        &self,
        agent_ids: &[String],
        schedule: Option<&str>,
    ) -> Result<MonitoringStartResult, MonitorError> {
        if agent_ids.is_empty() {
            return Err(MonitorError::InvalidRequest(
                "agent_ids must not be empty".to_string(),
            ));
        }

        log::info!("starting monitoring for {} agents", agent_ids.len());

        {
            let mut agents = self.agents.write().unwrap();
            for agent_id in agent_ids {
                agents.insert(agent_id.clone());
                self.state.register_agent(agent_id);
            }
        }

        let initial_changes = self.poll_once().await;

        let mut scheduled = false;
        let mut scheduling_error = None;

        if let Some(spec) = schedule {
            if self.config.enable_scheduling {
                match Schedule::parse(spec) {
                    Ok(parsed) => {
                        self.scheduler
                            .arm(parsed, self.engine.clone(), self.agents.clone());
                        scheduled = true;
                    }
                    Err(e) => {
                        log::error!("{}", e);
                        scheduling_error = Some(e.to_string());
                    }
                }
            } else {
                log::warn!("scheduling disabled; schedule spec ignored, poll manually");
            }
        }

        *self.phase.write().unwrap() = MonitorPhase::Monitoring;

        Ok(MonitoringStartResult {
            status: "monitoring_started".to_string(),
            agents: agent_ids.to_vec(),
            poll_interval: self.config.poll_interval_secs,
            timestamp: Utc::now(),
            scheduling_enabled: self.config.enable_scheduling,
            scheduled,
            scheduling_error,
            notification_channels: self.config.channels.clone(),
            initial_poll_changes: initial_changes.len(),
        })
    }

    /// Run one poll cycle over the whole monitored set, waiting for any
    /// in-flight cycle first. This is the manual path used when
    /// scheduling is disabled or no schedule was armed.
    pub async fn poll_once(&self) -> Vec<StatusChange> {
        let ids: Vec<AgentId> = self.agents.read().unwrap().iter().cloned().collect();
        if ids.is_empty() {
            return Vec::new();
        }
        self.engine.poll_cycle(&ids).await
    }

    /// Stop monitoring one agent, or everything when `agent_id` is None.
    ///
    /// Stopping everything disarms the scheduler; the in-flight cycle, if
    /// any, completes. Per-agent stop removes the agent from the monitored
    /// set but keeps its accumulated state queryable.
    pub fn stop_monitoring(&self, agent_id: Option<&str>) -> StopResult {
        match agent_id {
            Some(id) => {
                log::info!("stopping monitoring for agent {}", id);
                self.agents.write().unwrap().remove(id);
            }
            None => {
                log::info!("stopping all monitoring");
                self.scheduler.disarm();
                *self.phase.write().unwrap() = MonitorPhase::Stopped;
            }
        }

        StopResult {
            status: "monitoring_stopped".to_string(),
            agent_id: agent_id.map(String::from),
            timestamp: Utc::now(),
        }
    }

    /// Current status of one agent plus its five most recent changes.
    pub fn agent_status(&self, agent_id: &str) -> Result<AgentStatusReport, MonitorError> {
        let snapshot = self
            .state
            .current_snapshot(agent_id)
            .ok_or_else(|| MonitorError::UnknownAgent(agent_id.to_string()))?;

        Ok(AgentStatusReport {
            agent_id: agent_id.to_string(),
            current_status: snapshot.status,
            last_updated: snapshot.timestamp,
            details: snapshot.details,
            error: snapshot.error_message,
            progress: snapshot.completion_percentage,
            recent_changes: self.state.recent_changes(agent_id, 5),
        })
    }

    /// The last `limit` snapshots recorded for one agent, oldest first.
    pub fn status_history(
        &self,
        agent_id: &str,
        limit: usize,
    ) -> Result<Vec<AgentStatusSnapshot>, MonitorError> {
        if !self.state.is_registered(agent_id) {
            return Err(MonitorError::UnknownAgent(agent_id.to_string()));
        }
        Ok(self.state.history(agent_id, limit))
    }

    pub fn phase(&self) -> MonitorPhase {
        *self.phase.read().unwrap()
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduler.is_armed()
    }

    pub fn monitored_agents(&self) -> Vec<AgentId> {
        self.agents.read().unwrap().iter().cloned().collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MonitoringStartResult {
    pub status: String,
    pub agents: Vec<String>,
    pub poll_interval: u64,
    pub timestamp: DateTime<Utc>,
    pub scheduling_enabled: bool,
    pub scheduled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduling_error: Option<String>,
    pub notification_channels: Vec<ChannelKind>,
    pub initial_poll_changes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StopResult {
    pub status: String,
    pub agent_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentStatusReport {
    pub agent_id: String,
    pub current_status: AgentStatus,
    pub last_updated: DateTime<Utc>,
    pub details: HashMap<String, Value>,
    pub error: Option<String>,
    pub progress: u8,
    pub recent_changes: Vec<StatusChange>,
}
