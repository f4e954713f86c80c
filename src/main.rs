mod cli;
mod config;
mod error;
mod logging;
mod metrics;
mod monitor;
mod publisher;
mod runtime;
mod shutdown;

use anyhow::{Context, Result};
use monitor::Supervisor;
use publisher::HttpPublisher;
use runtime::DockerRuntime;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::parse();

    if let Some(cli::Commands::Version) = cli.command {
        println!("dockmetrix v{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    logging::init(&cli)?;

    let config = match config::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    if let Some(cli::Commands::Validate) = cli.command {
        print!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    info!(version = env!("CARGO_PKG_VERSION"), "Starting dockmetrix");

    let publisher = HttpPublisher::new(&config.sink, config.publish_timeout()?)?;
    info!(
        sink = %config.sink.address,
        index = %config.sink.index,
        "Publishing container metrics"
    );

    let runtime = DockerRuntime::connect(config.docker.socket.as_deref())
        .await
        .context("Failed to set up Docker client")?;

    let supervisor = Supervisor::new(
        Arc::new(runtime),
        Arc::new(publisher),
        config.labels.clone(),
    );

    supervisor
        .run(config.poll_interval()?, shutdown::signal())
        .await;

    Ok(())
}
