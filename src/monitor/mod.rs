//! Container monitoring: discovery, per-container stats consumers and the
//! set of containers currently being watched.

mod consumer;
mod labels;
mod supervisor;
mod tracker;

#[cfg(test)]
mod testing;

pub use supervisor::Supervisor;

use consumer::StatsConsumer;
use labels::extract_labels;
use tracker::TrackedContainers;

use crate::config::LabelsConfig;
use crate::runtime::ContainerDetails;

/// Snapshot of a container taken when it is first discovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerDescriptor {
    pub id: String,
    pub name: String,
    pub host: String,
    pub app_id: String,
}

impl ContainerDescriptor {
    pub fn from_details(id: &str, details: &ContainerDetails, keys: &LabelsConfig) -> Self {
        let labels = extract_labels(&details.env, keys);

        Self {
            id: id.to_string(),
            // Docker reports names as "/name"
            name: details.name.trim_start_matches('/').to_string(),
            host: labels.host,
            app_id: labels.app_id,
        }
    }
}
