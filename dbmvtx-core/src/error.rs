//! Error types for the DB-MVTX9180 platform

use thiserror::Error;

/// Core error type for platform operations
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Register bus read failures (non-zero adapter status, unparsable reply)
    #[error("Register read failed at offset {offset:#04x}: {reason}")]
    Register { offset: u8, reason: String },

    /// Watchdog control failures
    #[error("Watchdog error: {0}")]
    Watchdog(String),

    /// Invalid input or arguments
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation is not implemented for this device
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// Index outside the configured range
    #[error("{kind} index out of range: {index} (valid range 0-{max})", max = count.saturating_sub(1))]
    OutOfRange {
        kind: &'static str,
        index: usize,
        count: usize,
    },

    /// Parsing errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type alias for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;

impl From<toml::de::Error> for PlatformError {
    fn from(err: toml::de::Error) -> Self {
        PlatformError::Config(err.to_string())
    }
}
