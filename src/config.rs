use crate::cli::Cli;
use crate::error::{MonitorError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub sink: SinkConfig,
    #[serde(default)]
    pub docker: DockerConfig,
    #[serde(default)]
    pub labels: LabelsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink host address, e.g. "10.0.0.5:9200". Required.
    #[serde(default)]
    pub address: String,
    #[serde(default = "default_index")]
    pub index: String,
    #[serde(default = "default_publish_timeout")]
    pub timeout: String,
}

fn default_index() -> String {
    "logstash-docker".to_string()
}

fn default_publish_timeout() -> String {
    "10s".to_string()
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            index: default_index(),
            timeout: default_publish_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DockerConfig {
    #[serde(default)]
    pub socket: Option<String>,
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,
}

fn default_poll_interval() -> String {
    "5s".to_string()
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            socket: None,
            poll_interval: default_poll_interval(),
        }
    }
}

/// Environment keys read from each container to label its metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelsConfig {
    #[serde(default = "default_app_id_key")]
    pub app_id_key: String,
    #[serde(default = "default_host_key")]
    pub host_key: String,
}

fn default_app_id_key() -> String {
    "MARATHON_APP_ID".to_string()
}

fn default_host_key() -> String {
    "HOST".to_string()
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            app_id_key: default_app_id_key(),
            host_key: default_host_key(),
        }
    }
}

impl Config {
    pub fn poll_interval(&self) -> Result<Duration> {
        parse_duration("docker.poll_interval", &self.docker.poll_interval)
    }

    pub fn publish_timeout(&self) -> Result<Duration> {
        parse_duration("sink.timeout", &self.sink.timeout)
    }
}

fn parse_duration(field: &str, value: &str) -> Result<Duration> {
    humantime::parse_duration(value.trim())
        .map_err(|e| MonitorError::Config(format!("Invalid {} '{}': {}", field, value, e)))
}

/// Resolve configuration: defaults, then the optional file, then CLI flags
/// and environment variables.
pub fn load(cli: &Cli) -> Result<Config> {
    let mut config = match cli.config {
        Some(ref path) => load_file(path)?,
        None => Config::default(),
    };

    apply_overrides(&mut config, cli);
    validate(&config)?;

    Ok(config)
}

/// Load config from file with environment variable substitution
fn load_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| MonitorError::Config(format!("Failed to read config file: {}", e)))?;

    let content = substitute_env_vars(&content)?;

    Ok(serde_yaml::from_str(&content)?)
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(ref addr) = cli.logger_addr {
        config.sink.address = addr.clone();
    }
    if let Some(ref index) = cli.logger_index {
        if !index.is_empty() {
            config.sink.index = index.clone();
        }
    }
    if let Some(ref timeout) = cli.publish_timeout {
        config.sink.timeout = timeout.clone();
    }
    if let Some(ref socket) = cli.docker_socket {
        config.docker.socket = Some(socket.clone());
    }
    if let Some(ref interval) = cli.poll_interval {
        config.docker.poll_interval = interval.clone();
    }
}

/// Substitute ${VAR} patterns with environment variables
fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([^}]+)\}")
        .map_err(|e| MonitorError::Config(format!("Invalid substitution pattern: {}", e)))?;
    let mut result = content.to_string();
    let mut missing_vars = Vec::new();

    for cap in re.captures_iter(content) {
        let var_name = &cap[1];
        let placeholder = &cap[0];

        match std::env::var(var_name) {
            Ok(value) => {
                result = result.replace(placeholder, &value);
            }
            Err(_) => {
                missing_vars.push(var_name.to_string());
            }
        }
    }

    if !missing_vars.is_empty() {
        for var in &missing_vars {
            let placeholder = format!("${{{}}}", var);
            result = result.replace(&placeholder, "");
        }
        tracing::warn!(
            missing = ?missing_vars,
            "Some environment variables are not set"
        );
    }

    Ok(result)
}

/// Validate configuration
fn validate(config: &Config) -> Result<()> {
    // The agent has nowhere to send metrics without a sink
    if config.sink.address.trim().is_empty() {
        return Err(MonitorError::Config(
            "No sink address configured (sink.address or LOGGER_ADDR env var)".to_string(),
        ));
    }

    if config.sink.index.is_empty() {
        return Err(MonitorError::Config("Sink index must not be empty".to_string()));
    }

    if config.poll_interval()?.is_zero() {
        return Err(MonitorError::Config(
            "docker.poll_interval must be greater than zero".to_string(),
        ));
    }

    config.publish_timeout()?;

    for (field, key) in [
        ("labels.app_id_key", &config.labels.app_id_key),
        ("labels.host_key", &config.labels.host_key),
    ] {
        if key.is_empty() || key.contains('=') {
            return Err(MonitorError::Config(format!(
                "{} must be a non-empty variable name",
                field
            )));
        }
    }

    Ok(())
}
