//! Error types for loading and validating the monitor configuration

use thiserror::Error;

/// Errors raised while reading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("failed to read configuration file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid configuration document
    #[error("invalid configuration file provided: {0}")]
    Parse(#[from] serde_json::Error),

    /// The document parsed but violates a structural rule
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
