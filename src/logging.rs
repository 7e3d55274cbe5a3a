/// Tracing subscriber setup
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::ConfigError;

/// Install the global fmt subscriber.
///
/// `RUST_LOG` wins over the configured filter when set. Calling this twice is
/// harmless; the second call keeps the first subscriber.
pub fn init(config: &LoggingConfig) -> Result<(), ConfigError> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(directives),
        _ => EnvFilter::try_new(config.directives()),
    }
    .map_err(|e| ConfigError::Invalid(format!("logging filter: {}", e)))?;

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_err()
    {
        tracing::debug!("tracing subscriber already installed");
    }

    Ok(())
}
