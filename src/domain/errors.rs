//! Domain error types
//!
//! This module defines the error hierarchy for Courier. All errors are
//! domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main Courier error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum CourierError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Remote/local results API errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Message delivery errors
    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    /// Stream protocol errors
    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    /// EMR database errors
    #[error("Database error: {0}")]
    Database(String),

    /// Local API discovery errors
    #[error("Discovery error: {0}")]
    Discovery(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Results API errors
///
/// Errors that occur when talking to the remote results API or the local
/// API. These errors don't expose the underlying HTTP client types.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The configured endpoint is not a valid URL
    #[error("Invalid API endpoint: {0}")]
    InvalidEndpoint(String),

    /// Failed to connect to the API
    #[error("Failed to connect to API: {0}")]
    ConnectionFailed(String),

    /// Login rejected or token missing
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Response body could not be decoded
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

/// Message delivery errors
///
/// Per-record and per-EMR-group failures. These are recorded in the batch
/// summary and never abort the remaining records, so they are `Clone` for
/// cached directory-resolution results.
#[derive(Debug, Clone, Error)]
pub enum DeliveryError {
    /// Record lacks a mandatory identity field
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Target EMR software is not one of the handled kinds
    #[error("Unsupported EMR software: {0}")]
    UnsupportedEmr(String),

    /// No import directory matched for the EMR kind
    #[error("No import directory found for {0}")]
    DirectoryNotFound(String),

    /// The directory lookup itself failed (connection, query)
    #[error("Import directory lookup failed: {0}")]
    DirectoryLookup(String),

    /// Message text cannot be represented in the EMR's encoding
    #[error("Message encoding failed: {0}")]
    Escape(String),

    /// Filesystem write failed
    #[error("Failed to write message file: {0}")]
    Write(String),
}

/// Stream protocol errors
///
/// Raised by the framed TCP front end; any of these terminates the
/// connection after a best-effort error report to the client.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Socket-level failure
    #[error("Stream I/O error: {0}")]
    Io(String),

    /// Payload is not UTF-8 text or not a JSON record array
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// No complete payload arrived within the idle timeout
    #[error("Connection idle timeout")]
    IdleTimeout,
}

// Conversion from std::io::Error
impl From<std::io::Error> for CourierError {
    fn from(err: std::io::Error) -> Self {
        CourierError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for CourierError {
    fn from(err: serde_json::Error) -> Self {
        CourierError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for CourierError {
    fn from(err: toml::de::Error) -> Self {
        CourierError::Configuration(format!("TOML parse error: {err}"))
    }
}

// The framed codec requires its error type to absorb socket errors
impl From<std::io::Error> for StreamError {
    fn from(err: std::io::Error) -> Self {
        StreamError::Io(err.to_string())
    }
}
