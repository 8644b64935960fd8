use thiserror::Error;

/// Main error type for the hostlog façade and its command channel
#[derive(Debug, Error)]
pub enum HostLogError {
    // Channel-related errors
    #[error("Command channel unavailable")]
    ChannelUnavailable,

    #[error("Failed to connect to host: {0}")]
    ConnectionError(String),

    #[error("IPC error: {0}")]
    IpcError(String),

    #[error("IPC protocol error: {0}")]
    ProtocolError(String),

    #[error("Host rejected command: {0}")]
    Rejected(String),

    // Location resolution errors
    #[error("Location resolution failed: {0}")]
    Resolution(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid configuration file: {0}")]
    InvalidConfig(String),

    #[error("Missing required configuration field: {0}")]
    MissingConfigField(String),

    #[error("Configuration validation failed: {0}")]
    ConfigValidationError(String),

    #[error("Unknown severity: {0}")]
    UnknownSeverity(String),

    // IO errors (automatically converted from std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}

/// Result type alias for hostlog operations
pub type Result<T> = std::result::Result<T, HostLogError>;
