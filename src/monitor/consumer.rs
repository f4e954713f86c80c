use super::{ContainerDescriptor, TrackedContainers};
use crate::metrics::MetricDocument;
use crate::publisher::MetricPublisher;
use crate::runtime::ContainerRuntime;
use futures::StreamExt;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Streams one container's stats until the stream ends, publishing a
/// document per sample.
pub struct StatsConsumer {
    descriptor: ContainerDescriptor,
    runtime: Arc<dyn ContainerRuntime>,
    publisher: Arc<dyn MetricPublisher>,
    tracked: Arc<TrackedContainers>,
}

/// How a consumer's stream finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumerExit {
    pub samples: u64,
    pub publish_failures: u64,
    pub stream_failed: bool,
}

impl StatsConsumer {
    pub fn new(
        descriptor: ContainerDescriptor,
        runtime: Arc<dyn ContainerRuntime>,
        publisher: Arc<dyn MetricPublisher>,
        tracked: Arc<TrackedContainers>,
    ) -> Self {
        Self {
            descriptor,
            runtime,
            publisher,
            tracked,
        }
    }

    /// Consume the stream to its end. The container id is released from the
    /// tracked set whether the stream ended cleanly or failed; a failed
    /// stream is not reopened.
    pub async fn run(self) -> ConsumerExit {
        let id = self.descriptor.id.as_str();
        let mut stream = self.runtime.stats(id);
        let mut exit = ConsumerExit {
            samples: 0,
            publish_failures: 0,
            stream_failed: false,
        };
        let mut stream_error = None;

        while let Some(item) = stream.next().await {
            let stats = match item {
                Ok(stats) => stats,
                Err(e) => {
                    stream_error = Some(e);
                    break;
                }
            };

            exit.samples += 1;
            let document = MetricDocument::from_sample(&self.descriptor, &stats);

            if let Err(e) = self.publisher.publish(document).await {
                exit.publish_failures += 1;
                warn!(container_id = %id, error = %e, "Dropping metric sample");
            }
        }
        drop(stream);

        let monitored_for = self.tracked.release(id);

        debug!(
            container_id = %id,
            name = %self.descriptor.name,
            samples = exit.samples,
            monitored_for = ?monitored_for,
            "Stopped monitoring container"
        );

        if let Some(e) = stream_error {
            exit.stream_failed = true;
            error!(container_id = %id, error = %e, "Stats stream failed");
        }

        exit
    }
}
