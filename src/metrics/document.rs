use super::derive::{cpu_percent_of, memory_percent_of};
use crate::monitor::ContainerDescriptor;
use crate::runtime::RawStats;
use serde::Serialize;

/// One metric document per stats sample, in the sink's field naming.
///
/// The publish timestamp is not part of the document; the publisher adds
/// `@timestamp` at send time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricDocument {
    pub host: String,
    #[serde(rename = "appID")]
    pub app_id: String,
    pub name: String,
    #[serde(rename = "cID")]
    pub container_id: String,
    #[serde(rename = "cpuPercent")]
    pub cpu_percent: u64,
    #[serde(rename = "memUsage")]
    pub memory_usage: u64,
    #[serde(rename = "memLimit")]
    pub memory_limit: u64,
    #[serde(rename = "maxMemUsage")]
    pub max_memory_usage: u64,
    #[serde(rename = "memPercent")]
    pub memory_percent: u64,
}

impl MetricDocument {
    pub fn from_sample(descriptor: &ContainerDescriptor, stats: &RawStats) -> Self {
        Self {
            host: descriptor.host.clone(),
            app_id: descriptor.app_id.clone(),
            name: descriptor.name.clone(),
            container_id: descriptor.id.clone(),
            cpu_percent: cpu_percent_of(stats),
            memory_usage: stats.memory_usage,
            memory_limit: stats.memory_limit,
            max_memory_usage: stats.memory_max_usage,
            memory_percent: memory_percent_of(stats),
        }
    }
}

/// Wire form of a document: the document's fields plus the send time.
#[derive(Debug, Serialize)]
pub struct TimestampedDocument<'a> {
    #[serde(flatten)]
    pub document: &'a MetricDocument,
    #[serde(rename = "@timestamp")]
    pub timestamp_ms: i64,
}
