//! Domain error types
//!
//! This module defines the error hierarchy for offboard.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main offboard error type
///
/// This is the primary error type used throughout the application. Every
/// variant carries enough context (job and artifact identifiers, HTTP status,
/// remote status strings) to diagnose a failure without re-querying.
#[derive(Debug, Error)]
pub enum OffboardError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Credential or scope failures. Never retried.
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// A remote resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Non-success response from one of the remote services
    #[error("{service} returned status {status}: {message}")]
    Service {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// Export reached a terminal status other than COMPLETED
    #[error("Export {export_id} in matter {matter_id} did not complete. Status: {status}")]
    ExportFailed {
        matter_id: String,
        export_id: String,
        status: String,
    },

    /// Export was still running after the configured number of polls
    #[error("Export {export_id} in matter {matter_id} still running after {attempts} polls")]
    PollTimeout {
        matter_id: String,
        export_id: String,
        attempts: u32,
    },

    /// Streamed download or upload failure
    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),

    /// Network/connection errors
    #[error("Connection error: {0}")]
    Connection(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// A wait was interrupted by the shutdown signal
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl OffboardError {
    /// Whether the error comes from a terminal export state rather than transport
    pub fn is_state_error(&self) -> bool {
        matches!(
            self,
            OffboardError::ExportFailed { .. } | OffboardError::PollTimeout { .. }
        )
    }
}

/// Errors raised while moving bytes between object storage, local disk and
/// the retention store
#[derive(Debug, Error)]
pub enum TransferError {
    /// Non-2xx response on a streamed read or a chunk write
    #[error("{object}: HTTP {status}: {body}")]
    HttpStatus {
        object: String,
        status: u16,
        body: String,
    },

    /// The byte stream broke before the transport signalled its end
    #[error("{object}: stream failed: {message}")]
    Stream { object: String, message: String },

    /// Fewer bytes arrived than the object's authoritative size
    #[error("{object}: expected {expected} bytes, received {received}")]
    Incomplete {
        object: String,
        expected: u64,
        received: u64,
    },

    /// The upload session ended without the service confirming the file
    #[error("{object}: upload session ended without a created item")]
    NoFinalResponse { object: String },
}

impl From<std::io::Error> for OffboardError {
    fn from(err: std::io::Error) -> Self {
        OffboardError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for OffboardError {
    fn from(err: serde_json::Error) -> Self {
        OffboardError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for OffboardError {
    fn from(err: toml::de::Error) -> Self {
        OffboardError::Configuration(format!("TOML parse error: {err}"))
    }
}
