use super::MetricPublisher;
use crate::config::SinkConfig;
use crate::error::{MonitorError, Result};
use crate::metrics::{MetricDocument, TimestampedDocument};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::debug;

/// Posts documents to `{address}/{index}-{YYYY.MM.DD}/containers`, one
/// daily index per prefix.
pub struct HttpPublisher {
    client: reqwest::Client,
    base_url: String,
    index: String,
}

impl HttpPublisher {
    pub fn new(sink: &SinkConfig, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!("dockmetrix/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| MonitorError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url(&sink.address),
            index: sink.index.clone(),
        })
    }

    pub fn url_for(&self, now: DateTime<Utc>) -> String {
        format!(
            "{}/{}-{}/containers",
            self.base_url,
            self.index,
            now.format("%Y.%m.%d")
        )
    }
}

fn base_url(address: &str) -> String {
    let address = address.trim().trim_end_matches('/');
    if address.starts_with("http://") || address.starts_with("https://") {
        address.to_string()
    } else {
        format!("http://{}", address)
    }
}

#[async_trait]
impl MetricPublisher for HttpPublisher {
    async fn publish(&self, document: MetricDocument) -> Result<()> {
        let now = Utc::now();
        let payload = serde_json::to_vec(&TimestampedDocument {
            document: &document,
            // second resolution, expressed in milliseconds
            timestamp_ms: now.timestamp() * 1000,
        })?;

        debug!(payload = %String::from_utf8_lossy(&payload), "Publishing metrics");

        let url = self.url_for(now);
        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| MonitorError::Publish(format!("POST {} failed: {}", url, e)))?;

        let status = response.status();
        // drain so the connection can be reused
        let _ = response.bytes().await;

        debug!(url = %url, status = status.as_u16(), "Metrics POST returned");

        if status.is_success() {
            Ok(())
        } else {
            Err(MonitorError::Publish(format!(
                "POST {} returned {}",
                url, status
            )))
        }
    }
}
