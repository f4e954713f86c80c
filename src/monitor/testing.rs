//! In-memory runtime and publisher used by the monitor tests.

use crate::error::{MonitorError, Result};
use crate::metrics::MetricDocument;
use crate::publisher::MetricPublisher;
use crate::runtime::{ContainerDetails, ContainerRuntime, ContainerSummary, RawStats, StatsStream};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn sample(
    cpu: u64,
    precpu: u64,
    system: u64,
    presystem: u64,
    cpus: u32,
    mem: u64,
    limit: u64,
) -> RawStats {
    RawStats {
        cpu_total_usage: cpu,
        precpu_total_usage: precpu,
        system_cpu_usage: system,
        presystem_cpu_usage: presystem,
        cpu_count: cpus,
        memory_usage: mem,
        memory_limit: limit,
        memory_max_usage: mem,
    }
}

#[derive(Default)]
struct FakeContainer {
    details: ContainerDetails,
    samples: Vec<RawStats>,
    hold_open: bool,
    fail_stream: bool,
    fail_inspect: bool,
    subscriptions: usize,
}

#[derive(Default)]
pub struct FakeRuntime {
    containers: Mutex<BTreeMap<String, FakeContainer>>,
    list_error: Mutex<Option<fn(String) -> MonitorError>>,
    hang_list: AtomicBool,
    list_calls: AtomicUsize,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, id: &str, name: &str, env: &[&str]) {
        self.containers.lock().unwrap().insert(
            id.to_string(),
            FakeContainer {
                details: ContainerDetails {
                    name: name.to_string(),
                    env: env.iter().map(|s| s.to_string()).collect(),
                },
                ..Default::default()
            },
        );
    }

    pub fn remove(&self, id: &str) {
        self.containers.lock().unwrap().remove(id);
    }

    pub fn push_samples(&self, id: &str, samples: Vec<RawStats>) {
        if let Some(c) = self.containers.lock().unwrap().get_mut(id) {
            c.samples.extend(samples);
        }
    }

    /// Keep the stream open after the queued samples, like a live container.
    pub fn hold_open(&self, id: &str) {
        if let Some(c) = self.containers.lock().unwrap().get_mut(id) {
            c.hold_open = true;
        }
    }

    pub fn fail_stream(&self, id: &str) {
        if let Some(c) = self.containers.lock().unwrap().get_mut(id) {
            c.fail_stream = true;
        }
    }

    pub fn fail_inspect(&self, id: &str) {
        if let Some(c) = self.containers.lock().unwrap().get_mut(id) {
            c.fail_inspect = true;
        }
    }

    pub fn fail_list(&self, make: Option<fn(String) -> MonitorError>) {
        *self.list_error.lock().unwrap() = make;
    }

    /// Make listing never return, like a daemon that accepts but stalls.
    pub fn hang_list(&self, hang: bool) {
        self.hang_list.store(hang, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn subscriptions(&self, id: &str) -> usize {
        self.containers
            .lock()
            .unwrap()
            .get(id)
            .map(|c| c.subscriptions)
            .unwrap_or(0)
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn list_running(&self) -> Result<Vec<ContainerSummary>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.hang_list.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if let Some(make) = *self.list_error.lock().unwrap() {
            return Err(make("docker.sock unavailable".to_string()));
        }
        Ok(self
            .containers
            .lock()
            .unwrap()
            .keys()
            .map(|id| ContainerSummary { id: id.clone() })
            .collect())
    }

    async fn inspect(&self, id: &str) -> Result<ContainerDetails> {
        let containers = self.containers.lock().unwrap();
        match containers.get(id) {
            Some(c) if c.fail_inspect => Err(MonitorError::Query("inspect failed".to_string())),
            Some(c) => Ok(c.details.clone()),
            None => Err(MonitorError::NotFound(id.to_string())),
        }
    }

    fn stats(&self, id: &str) -> StatsStream {
        let mut containers = self.containers.lock().unwrap();
        let Some(c) = containers.get_mut(id) else {
            return stream::once(async { Err(MonitorError::Stream("no such container".into())) })
                .boxed();
        };
        c.subscriptions += 1;

        let samples = stream::iter(c.samples.clone().into_iter().map(Ok));
        if c.fail_stream {
            samples
                .chain(stream::once(async {
                    Err(MonitorError::Stream("connection reset".to_string()))
                }))
                .boxed()
        } else if c.hold_open {
            samples.chain(stream::pending()).boxed()
        } else {
            samples.boxed()
        }
    }
}

/// Records successfully published documents; can fail the first N calls.
#[derive(Default)]
pub struct RecordingPublisher {
    documents: Mutex<Vec<MetricDocument>>,
    failures_left: Mutex<usize>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_first(n: usize) -> Self {
        Self {
            failures_left: Mutex::new(n),
            ..Default::default()
        }
    }

    pub fn documents(&self) -> Vec<MetricDocument> {
        self.documents.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetricPublisher for RecordingPublisher {
    async fn publish(&self, document: MetricDocument) -> Result<()> {
        {
            let mut failures_left = self.failures_left.lock().unwrap();
            if *failures_left > 0 {
                *failures_left -= 1;
                return Err(MonitorError::Publish("sink returned 503".to_string()));
            }
        }
        self.documents.lock().unwrap().push(document);
        Ok(())
    }
}
