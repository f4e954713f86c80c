use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// Ids of containers that currently have a stats consumer.
///
/// Only the supervisor inserts and only the consumer owning an id removes
/// it, so an id is never written by two tasks at once. The map itself must
/// still tolerate discovery reads racing with other ids being released.
#[derive(Debug, Default)]
pub struct TrackedContainers {
    /// container id -> when monitoring started
    entries: DashMap<String, Instant>,
}

impl TrackedContainers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Mark `id` as monitored. Returns false if it already was.
    pub fn track(&self, id: &str) -> bool {
        let mut inserted = false;
        self.entries.entry(id.to_string()).or_insert_with(|| {
            inserted = true;
            Instant::now()
        });
        if inserted {
            debug!(container_id = %id, "Tracking container");
        }
        inserted
    }

    /// Release `id`, returning how long it was monitored.
    pub fn release(&self, id: &str) -> Option<Duration> {
        let released = self.entries.remove(id).map(|(_, since)| since.elapsed());
        if released.is_some() {
            debug!(container_id = %id, "Released container");
        }
        released
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.key().clone()).collect()
    }
}
