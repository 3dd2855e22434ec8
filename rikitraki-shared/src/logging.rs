//! Tracing subscriber setup for applications embedding the client

use crate::{LoggingConfig, Result, TrackerError};
use tracing_subscriber::{fmt, EnvFilter};

/// Install a global `fmt` subscriber.
///
/// `RUST_LOG` takes precedence over `config.level`. Installing twice returns
/// an error rather than panicking.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config)?;

    let result = match config.format.as_str() {
        "json" => {
            let subscriber = fmt::Subscriber::builder()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
        "pretty" | "" => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(filter)
                .with_target(false)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
        other => {
            return Err(TrackerError::Config(format!("Unknown log format: {other}")));
        }
    };

    result.map_err(|e| TrackerError::Config(format!("Failed to set logging subscriber: {e}")))
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(format!("{},hyper=warn,reqwest=warn", config.level))
            .map_err(|e| TrackerError::Config(format!("Invalid log level '{}': {e}", config.level))),
    }
}
