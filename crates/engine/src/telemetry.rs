use tracing_subscriber::EnvFilter;

use crate::config::ServiceConfig;
use crate::error::EngineError;

/// Install the global `fmt` subscriber. A valid `RUST_LOG` wins over the
/// configured filter. Fails if a subscriber is already installed.
pub fn init(config: &ServiceConfig) -> Result<(), EngineError> {
    let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = filter_from(from_env.as_deref(), &config.log_filter)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| EngineError::Telemetry(e.to_string()))
}

fn filter_from(from_env: Option<&str>, configured: &str) -> Result<EnvFilter, EngineError> {
    if let Some(filter) = from_env.and_then(|directives| EnvFilter::try_new(directives).ok()) {
        return Ok(filter);
    }
    EnvFilter::try_new(configured).map_err(|e| EngineError::Telemetry(e.to_string()))
}
