//! Error types for Spotlight
//!
//! Provides standardized error handling across the crate. Search-path
//! failures are never surfaced to the user; these errors exist for the
//! configuration, settings and snapshot loaders and for the CLI.

use thiserror::Error;

/// Errors that can occur in Spotlight
#[derive(Debug, Error)]
pub enum SpotlightError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// User settings blob errors
    #[error("Settings error: {0}")]
    Settings(String),

    /// Locale resource errors
    #[error("Locale error: {0}")]
    Locale(String),

    /// Collaborator (browser host) rejected a request
    #[error("Host error: {0}")]
    Host(String),

    /// Snapshot (sources/page JSON) loading errors
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("Config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Spotlight operations
pub type SpotlightResult<T> = Result<T, SpotlightError>;
