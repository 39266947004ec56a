use thiserror::Error;

/// Errors surfaced by the monitor control surface.
///
/// Per-agent and per-channel failures are not represented here; those are
/// isolated and logged where they occur so a single bad agent or channel
/// can never take down the monitor.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("could not arm schedule: {0}")]
    Scheduling(String),

    #[error("agent {0} is not being monitored")]
    UnknownAgent(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// A single agent's status could not be retrieved this cycle.
///
/// Non-fatal: the poll engine logs it and retains the agent's prior status.
#[derive(Debug, Error)]
#[error("status fetch failed for agent {agent_id}: {reason}")]
pub struct FetchError {
    pub agent_id: String,
    pub reason: String,
}

impl FetchError {
    pub fn new(agent_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            reason: reason.into(),
        }
    }
}

/// One notification channel failed to deliver.
///
/// Returned as a value from `Notifier::send` so the dispatcher can log it
/// and continue with the remaining channels.
#[derive(Debug, Error)]
#[error("{reason}")]
pub struct ChannelError {
    pub reason: String,
}

impl ChannelError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for ChannelError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest errors can embed the request URL; strip it so channel
        // endpoints never reach log output.
        Self::new(err.without_url().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = MonitorError::UnknownAgent("agent-9".to_string());
        assert_eq!(err.to_string(), "agent agent-9 is not being monitored");

        let err = FetchError::new("agent-1", "status file unreadable");
        assert!(err.to_string().contains("agent-1"));
        assert!(err.to_string().contains("status file unreadable"));
    }
}
