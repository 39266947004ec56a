pub mod change;
pub mod snapshot;

pub use change::{change_fingerprint, StatusChange};
pub use snapshot::AgentStatusSnapshot;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type AgentId = String;

/// Observed lifecycle states of an externally managed agent.
///
/// The underlying process is not under our control and may report states
/// out of order, so no transition graph is enforced here. The monitor only
/// detects that a transition happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Timeout,
    Cancelled,
    Unknown,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Pending => "pending",
            AgentStatus::Running => "running",
            AgentStatus::Completed => "completed",
            AgentStatus::Failed => "failed",
            AgentStatus::Timeout => "timeout",
            AgentStatus::Cancelled => "cancelled",
            AgentStatus::Unknown => "unknown",
        }
    }

    /// Statuses that warrant a WARNING-level alert rather than INFO.
    pub fn is_alarming(&self) -> bool {
        matches!(self, AgentStatus::Failed | AgentStatus::Timeout)
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery channels a notification can be fanned out to.
///
/// Channels are bound to `Notifier` implementations at configuration time;
/// there is no runtime string dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Log,
    File,
    Email,
    Webhook,
    Slack,
    Sms,
}

impl ChannelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Log => "log",
            ChannelKind::File => "file",
            ChannelKind::Email => "email",
            ChannelKind::Webhook => "webhook",
            ChannelKind::Slack => "slack",
            ChannelKind::Sms => "sms",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "log" => Ok(ChannelKind::Log),
            "file" => Ok(ChannelKind::File),
            "email" => Ok(ChannelKind::Email),
            "webhook" => Ok(ChannelKind::Webhook),
            "slack" => Ok(ChannelKind::Slack),
            "sms" => Ok(ChannelKind::Sms),
            other => Err(format!("unknown notification channel: {}", other)),
        }
    }
}
