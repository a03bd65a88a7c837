use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Console logging to stderr, keeping stdout for results.
///
/// `RUST_LOG` takes precedence over `level`. Call once per process.
pub fn init(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| anyhow!("invalid log level {level:?}: {e}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("initializing logging: {e}"))?;

    tracing::debug!(level, "logging initialized");
    Ok(())
}
