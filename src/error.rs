//! # Error Types
//!
//! Custom error types for the RC link using `thiserror`.
//!
//! Link-level faults (failed sends, timeouts) are not errors here: they are
//! recovered inside the cycle and reported as telemetry events.

use thiserror::Error;

/// Main error type for the RC link
#[derive(Debug, Error)]
pub enum RcLinkError {
    /// Configuration parse errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Payload that is not exactly one control packet long
    #[error("Malformed packet: expected {expected} bytes, got {actual}")]
    MalformedPacket { expected: usize, actual: usize },

    /// Telemetry serialization errors
    #[error("Telemetry error: {0}")]
    Telemetry(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the RC link
pub type Result<T> = std::result::Result<T, RcLinkError>;
