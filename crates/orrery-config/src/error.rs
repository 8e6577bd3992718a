//! Configuration error types.

/// Errors raised while loading, saving, or checking `config.ron`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read config: {0}")]
    ReadError(#[source] std::io::Error),

    /// The config directory or file could not be written.
    #[error("failed to write config: {0}")]
    WriteError(#[source] std::io::Error),

    /// The file is not valid RON for [`Config`](crate::Config).
    #[error("failed to parse config: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    #[error("failed to serialize config: {0}")]
    SerializeError(#[source] ron::Error),

    /// A value parsed fine but cannot drive a simulation.
    #[error("invalid config value {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}
