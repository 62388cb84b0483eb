//! Logging setup.
//!
//! The crate logs through the `log` macros; this installs a tracing
//! subscriber with a `LogTracer` bridge so those records flow into the
//! same pipeline as native tracing events.

use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Error, Debug)]
pub enum InitError {
    #[error("Failed to install log bridge: {0}")]
    LogBridge(String),

    #[error("Failed to install tracing subscriber: {0}")]
    Subscriber(String),
}

/// Installs the global subscriber. `RUST_LOG` overrides `default_filter`.
///
/// Calling this twice returns an error; callers that cannot know whether
/// a host application already installed one may ignore it.
pub fn init_logging(default_filter: &str) -> Result<(), InitError> {
    tracing_log::LogTracer::init().map_err(|e| InitError::LogBridge(e.to_string()))?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .map_err(|e| InitError::Subscriber(e.to_string()))?;

    tracing::debug!("Subscriber installed");
    Ok(())
}
