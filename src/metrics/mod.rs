mod derive;
mod document;

pub use document::{MetricDocument, TimestampedDocument};
