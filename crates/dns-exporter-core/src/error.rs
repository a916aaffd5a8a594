//! Error types for the DNS exporter
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for exporter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DNS exporter
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A provider call failed (network, authentication, API error, bad payload)
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Record type outside the supported set
    #[error("not supported record type: {0}")]
    UnsupportedRecordType(String),

    /// Structurally invalid aggregation input
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Malformed zone content
    #[error("Parse error: {0}")]
    Parse(String),

    /// Snapshot repository errors
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// Directory or file creation/write failures
    #[error("Filesystem error: {0}")]
    Filesystem(String),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// One or more provider tasks failed during a phase
    #[error("errors encountered during zone {phase} ({})", failed.join(", "))]
    Phase {
        /// Phase name, `fetching` or `exporting`
        phase: &'static str,
        /// Providers whose task failed
        failed: Vec<String>,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create an invalid record error
    pub fn invalid_record(msg: impl Into<String>) -> Self {
        Self::InvalidRecord(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a snapshot error
    pub fn snapshot(msg: impl Into<String>) -> Self {
        Self::Snapshot(msg.into())
    }

    /// Create a filesystem error
    pub fn filesystem(msg: impl Into<String>) -> Self {
        Self::Filesystem(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }
}
