use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Cannot reach container runtime: {0}")]
    Connection(String),

    #[error("Container runtime query failed: {0}")]
    Query(String),

    #[error("Container {0} not found")]
    NotFound(String),

    #[error("Stats stream error: {0}")]
    Stream(String),

    #[error("Publish error: {0}")]
    Publish(String),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
