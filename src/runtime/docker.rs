use super::{ContainerDetails, ContainerRuntime, ContainerSummary, RawStats, StatsStream};
use crate::error::{MonitorError, Result};
use async_trait::async_trait;
use bollard::container::{InspectContainerOptions, ListContainersOptions, Stats, StatsOptions};
use bollard::errors::Error as BollardError;
use bollard::Docker;
use futures::StreamExt;
use std::collections::HashMap;
use tracing::{debug, warn};

pub struct DockerRuntime {
    client: Docker,
}

impl DockerRuntime {
    /// Connect to the given socket, or the platform default when `None`.
    ///
    /// Connecting does not touch the socket; a failed ping is only logged
    /// because every discovery pass reports its own connection errors.
    pub async fn connect(socket_path: Option<&str>) -> Result<Self> {
        let client = match socket_path {
            Some(path) => Docker::connect_with_socket(path, 120, bollard::API_DEFAULT_VERSION),
            None => Docker::connect_with_socket_defaults(),
        }
        .map_err(|e| MonitorError::Connection(e.to_string()))?;

        match client.ping().await {
            Ok(_) => debug!("Docker daemon reachable"),
            Err(e) => warn!(error = %e, "Docker daemon not reachable yet"),
        }

        Ok(Self { client })
    }

    fn to_raw_stats(stats: &Stats) -> RawStats {
        let cpu = &stats.cpu_stats;
        let precpu = &stats.precpu_stats;

        // cgroup v2 hosts report no per-CPU breakdown, which reads as 0 CPUs
        let cpu_count = cpu
            .cpu_usage
            .percpu_usage
            .as_ref()
            .map(|v| v.len() as u32)
            .unwrap_or(0);

        RawStats {
            cpu_total_usage: cpu.cpu_usage.total_usage,
            precpu_total_usage: precpu.cpu_usage.total_usage,
            system_cpu_usage: cpu.system_cpu_usage.unwrap_or(0),
            presystem_cpu_usage: precpu.system_cpu_usage.unwrap_or(0),
            cpu_count,
            memory_usage: stats.memory_stats.usage.unwrap_or(0),
            memory_limit: stats.memory_stats.limit.unwrap_or(0),
            memory_max_usage: stats.memory_stats.max_usage.unwrap_or(0),
        }
    }
}

/// Failures to reach the daemon at all abort a discovery pass; anything the
/// daemon answered is a query failure.
fn query_error(err: BollardError) -> MonitorError {
    match err {
        BollardError::IOError { .. } | BollardError::RequestTimeoutError => {
            MonitorError::Connection(err.to_string())
        }
        other => MonitorError::Query(other.to_string()),
    }
}

fn inspect_error(err: BollardError, id: &str) -> MonitorError {
    match err {
        BollardError::DockerResponseServerError {
            status_code: 404, ..
        } => MonitorError::NotFound(id.to_string()),
        other => query_error(other),
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn list_running(&self) -> Result<Vec<ContainerSummary>> {
        let mut filters = HashMap::new();
        filters.insert("status".to_string(), vec!["running".to_string()]);

        let options = ListContainersOptions::<String> {
            filters,
            ..Default::default()
        };

        let containers = self
            .client
            .list_containers(Some(options))
            .await
            .map_err(query_error)?;

        Ok(containers
            .into_iter()
            .filter_map(|c| c.id)
            .map(|id| ContainerSummary { id })
            .collect())
    }

    async fn inspect(&self, id: &str) -> Result<ContainerDetails> {
        let response = self
            .client
            .inspect_container(id, None::<InspectContainerOptions>)
            .await
            .map_err(|e| inspect_error(e, id))?;

        Ok(ContainerDetails {
            name: response.name.unwrap_or_default(),
            env: response.config.and_then(|c| c.env).unwrap_or_default(),
        })
    }

    fn stats(&self, id: &str) -> StatsStream {
        let options = StatsOptions {
            stream: true,
            one_shot: false,
        };

        self.client
            .stats(id, Some(options))
            .map(|item| match item {
                Ok(stats) => Ok(Self::to_raw_stats(&stats)),
                Err(e) => Err(MonitorError::Stream(e.to_string())),
            })
            .boxed()
    }
}
