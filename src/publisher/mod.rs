mod http;

pub use http::HttpPublisher;

use crate::error::Result;
use crate::metrics::MetricDocument;
use async_trait::async_trait;

/// Delivers metric documents to the sink. One attempt per document; callers
/// log failures and move on.
#[async_trait]
pub trait MetricPublisher: Send + Sync {
    async fn publish(&self, document: MetricDocument) -> Result<()>;
}
