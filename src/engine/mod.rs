pub mod monitor;
pub mod poller;
pub mod schedule;
pub mod scheduler;

pub use monitor::{AgentMonitor, AgentStatusReport, MonitorPhase, MonitoringStartResult, StopResult};
pub use poller::PollEngine;
pub use schedule::Schedule;
pub use scheduler::Scheduler;
