pub mod config;
pub mod engine;
pub mod error;
pub mod notify;
pub mod source;
pub mod state;
pub mod types;

pub use config::MonitorConfig;
pub use engine::{AgentMonitor, MonitorPhase};
pub use error::{ChannelError, FetchError, MonitorError};
pub use types::*;
