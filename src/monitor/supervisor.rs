use super::consumer::ConsumerExit;
use super::{ContainerDescriptor, StatsConsumer, TrackedContainers};
use crate::config::LabelsConfig;
use crate::error::Result;
use crate::publisher::MetricPublisher;
use crate::runtime::ContainerRuntime;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Outcome of one discovery pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub running: usize,
    pub spawned: usize,
    pub already_tracked: usize,
    pub inspect_failed: usize,
}

/// Keeps exactly one stats consumer per running container.
///
/// Entries are only released by their consumer when its stream ends. A
/// container that leaves the running list while its stream stays open keeps
/// its entry; discovery never prunes.
pub struct Supervisor {
    runtime: Arc<dyn ContainerRuntime>,
    publisher: Arc<dyn MetricPublisher>,
    tracked: Arc<TrackedContainers>,
    labels: LabelsConfig,
    consumers: JoinSet<ConsumerExit>,
}

impl Supervisor {
    pub fn new(
        runtime: Arc<dyn ContainerRuntime>,
        publisher: Arc<dyn MetricPublisher>,
        labels: LabelsConfig,
    ) -> Self {
        Self {
            runtime,
            publisher,
            tracked: Arc::new(TrackedContainers::new()),
            labels,
            consumers: JoinSet::new(),
        }
    }

    /// Start a consumer for every running container that has none.
    ///
    /// A failed listing aborts the pass; a failed inspect skips only that
    /// container until the next pass.
    pub async fn reconcile(&mut self) -> Result<ReconcileSummary> {
        debug!("Listing running containers");
        let containers = self.runtime.list_running().await?;

        let mut summary = ReconcileSummary {
            running: containers.len(),
            ..Default::default()
        };

        for container in containers {
            let id = container.id;

            if self.tracked.contains(&id) {
                debug!(container_id = %id, "Container already monitored");
                summary.already_tracked += 1;
                continue;
            }

            let details = match self.runtime.inspect(&id).await {
                Ok(details) => details,
                Err(e) => {
                    warn!(container_id = %id, error = %e, "Failed to inspect container");
                    summary.inspect_failed += 1;
                    continue;
                }
            };

            let descriptor = ContainerDescriptor::from_details(&id, &details, &self.labels);

            info!(
                container_id = %id,
                name = %descriptor.name,
                app_id = %descriptor.app_id,
                host = %descriptor.host,
                "Monitoring container"
            );

            self.tracked.track(&id);
            let consumer = StatsConsumer::new(
                descriptor,
                self.runtime.clone(),
                self.publisher.clone(),
                self.tracked.clone(),
            );
            self.consumers.spawn(consumer.run());
            summary.spawned += 1;
        }

        Ok(summary)
    }

    /// Run discovery every `poll_interval` until `shutdown` resolves, then
    /// abort the remaining consumers. A discovery pass still waiting on the
    /// runtime is abandoned when `shutdown` resolves.
    pub async fn run<F>(mut self, poll_interval: Duration, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!(interval = ?poll_interval, "Starting container supervisor");

        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = &mut shutdown => break,
            }

            let outcome = tokio::select! {
                outcome = self.reconcile() => outcome,
                _ = &mut shutdown => break,
            };

            match outcome {
                Ok(summary) if summary.spawned > 0 || summary.inspect_failed > 0 => {
                    info!(
                        running = summary.running,
                        spawned = summary.spawned,
                        inspect_failed = summary.inspect_failed,
                        monitored = self.tracked.len(),
                        "Discovery pass complete"
                    );
                }
                Ok(summary) => debug!(
                    running = summary.running,
                    already_tracked = summary.already_tracked,
                    "Discovery pass complete"
                ),
                Err(e) => error!(error = %e, "Container discovery failed"),
            }
            self.reap_finished();
        }

        info!(
            containers = ?self.tracked.ids(),
            "Shutting down, stopping stats consumers"
        );
        self.consumers.shutdown().await;
        info!("Supervisor stopped");
    }

    /// Await every running consumer. Consumers only return once their stats
    /// stream ends.
    #[cfg(test)]
    pub async fn join_consumers(&mut self) -> Vec<ConsumerExit> {
        let mut exits = Vec::new();
        while let Some(joined) = self.consumers.join_next().await {
            match joined {
                Ok(exit) => exits.push(exit),
                Err(e) => error!(error = %e, "Stats consumer task failed"),
            }
        }
        exits
    }

    #[cfg(test)]
    pub fn tracked(&self) -> &TrackedContainers {
        &self.tracked
    }

    #[cfg(test)]
    pub fn active_consumers(&self) -> usize {
        self.consumers.len()
    }

    fn reap_finished(&mut self) {
        while let Some(joined) = self.consumers.try_join_next() {
            match joined {
                Ok(exit) => debug!(
                    samples = exit.samples,
                    publish_failures = exit.publish_failures,
                    stream_failed = exit.stream_failed,
                    "Stats consumer finished"
                ),
                Err(e) => error!(error = %e, "Stats consumer task failed"),
            }
        }
    }
}
