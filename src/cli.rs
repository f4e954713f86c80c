use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "dockmetrix",
    author,
    version,
    about = "Ships Docker container CPU and memory metrics to an HTTP sink",
    long_about = None
)]
pub struct Cli {
    /// Optional configuration file path
    #[arg(short, long, env = "DOCKMETRIX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Metrics sink address (e.g. "10.0.0.5:9200")
    #[arg(long, env = "LOGGER_ADDR")]
    pub logger_addr: Option<String>,

    /// Index name prefix; the current date is appended
    #[arg(long, env = "LOGGER_INDEX")]
    pub logger_index: Option<String>,

    /// Timeout for a single publish request (e.g. "10s")
    #[arg(long, env = "DOCKMETRIX_PUBLISH_TIMEOUT")]
    pub publish_timeout: Option<String>,

    /// Docker socket path (defaults to the platform socket)
    #[arg(long, env = "DOCKMETRIX_DOCKER_SOCKET")]
    pub docker_socket: Option<String>,

    /// Interval between container discovery passes (e.g. "5s")
    #[arg(long, env = "DOCKMETRIX_POLL_INTERVAL")]
    pub poll_interval: Option<String>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log format (json, pretty)
    #[arg(long, env = "DOCKMETRIX_LOG_FORMAT")]
    pub log_format: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start monitoring (default if no command specified)
    Run,

    /// Validate configuration and print the resolved settings
    Validate,

    /// Show current version
    Version,
}

pub fn parse() -> Cli {
    Cli::parse()
}

impl Cli {
    pub fn effective_log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    pub fn effective_log_format(&self) -> &str {
        self.log_format.as_deref().unwrap_or("json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["dockmetrix"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.effective_log_format(), "json");
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "dockmetrix",
            "--logger-addr",
            "es:9200",
            "--log-level",
            "debug",
            "validate",
        ])
        .unwrap();
        assert_eq!(cli.logger_addr.as_deref(), Some("es:9200"));
        assert_eq!(cli.effective_log_level(), "debug");
        assert!(matches!(cli.command, Some(Commands::Validate)));
    }
}
