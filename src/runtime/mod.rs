//! Container runtime access.
//!
//! The monitor only needs three things from a runtime: the ids of running
//! containers, one container's name and environment, and a live stats feed.
//! [`ContainerRuntime`] captures exactly that so the supervisor can be driven
//! by Docker in production and by an in-memory fake in tests.

mod docker;

pub use docker::DockerRuntime;

use crate::error::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// A running container as returned by the listing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSummary {
    pub id: String,
}

/// Metadata returned by inspecting a single container.
#[derive(Debug, Clone, Default)]
pub struct ContainerDetails {
    pub name: String,
    /// Declared environment as ordered `KEY=VALUE` strings.
    pub env: Vec<String>,
}

/// One point-in-time stats sample. The runtime pairs the current CPU
/// counters with the previous sample's, so no history is kept here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawStats {
    pub cpu_total_usage: u64,
    pub precpu_total_usage: u64,
    pub system_cpu_usage: u64,
    pub presystem_cpu_usage: u64,
    /// Number of logical CPUs the sample accounts for.
    pub cpu_count: u32,
    pub memory_usage: u64,
    pub memory_limit: u64,
    pub memory_max_usage: u64,
}

/// Lazy, unbounded, non-restartable sequence of samples for one container.
/// Ends when the container stops; yields `Err` on transport failure.
pub type StatsStream = BoxStream<'static, Result<RawStats>>;

#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// List running containers.
    async fn list_running(&self) -> Result<Vec<ContainerSummary>>;

    /// Fetch name and environment for one container.
    async fn inspect(&self, id: &str) -> Result<ContainerDetails>;

    /// Subscribe to the container's streaming stats.
    fn stats(&self, id: &str) -> StatsStream;
}
