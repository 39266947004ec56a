pub mod file;

pub use file::FileStatusSource;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::types::AgentStatusSnapshot;

/// Where the monitor reads agent status from.
///
/// How an implementation obtains the snapshot (file read, IPC, queue poll)
/// is its own concern; it is expected to bound its own I/O with timeouts.
/// A fetch failure makes the poll engine treat that agent's status as
/// unchanged for the cycle.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch(&self, agent_id: &str) -> Result<AgentStatusSnapshot, FetchError>;
}
