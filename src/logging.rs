use crate::cli::Cli;
use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// `--log-level` / `LOG_LEVEL` setting.
///
/// Logs go to stderr so that `validate` output on stdout stays clean.
pub fn init(cli: &Cli) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.effective_log_level()));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match cli.effective_log_format() {
        "json" => {
            let fmt_layer = fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_current_span(false)
                .with_file(false)
                .with_line_number(false);

            subscriber.with(fmt_layer).try_init()?;
        }
        _ => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false);

            subscriber.with(fmt_layer).try_init()?;
        }
    }

    Ok(())
}
