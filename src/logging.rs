//! Logging setup.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{SpotlightError, SpotlightResult};

/// Logger options.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive
    pub level: String,

    /// Include target module paths
    pub include_targets: bool,

    /// Colored output
    pub ansi: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            include_targets: true,
            ansi: true,
        }
    }
}

impl LoggerConfig {
    pub fn with_level(level: &str) -> Self {
        Self {
            level: level.to_string(),
            ..Self::default()
        }
    }
}

/// Build the filter: `RUST_LOG` wins over the configured level.
pub fn build_filter(level: &str) -> SpotlightResult<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| SpotlightError::Config(format!("Invalid log level {:?}: {}", level, e)))
}

/// Install the global subscriber. Logs go to stderr so stdout stays
/// machine-readable. Calling this twice returns an error.
pub fn init(config: &LoggerConfig) -> SpotlightResult<()> {
    let filter = build_filter(&config.level)?;

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.include_targets)
        .with_ansi(config.ansi);

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| SpotlightError::Config(format!("Logger already initialized: {}", e)))?;

    tracing::debug!("Logging initialized with level: {}", config.level);
    Ok(())
}
