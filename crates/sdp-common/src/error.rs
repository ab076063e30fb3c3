//! Error types for SDP

use thiserror::Error;

/// Result type alias for SDP operations
pub type Result<T> = std::result::Result<T, SdpError>;

/// Main error type for SDP
///
/// The uppercase `MISSING ... PARAMETER` / `INVALID FILE_TYPE PARAMETER`
/// wording is what operators grep for in provider tickets; keep it stable.
#[derive(Error, Debug)]
pub enum SdpError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid PDR syntax or group nesting. Fatal for the whole manifest:
    /// a truncated PDR must never silently under-report files.
    #[error("malformed PDR at line {line}: {message}")]
    MalformedManifest { line: usize, message: String },

    /// A FILE_SPEC lacks a recognizable directory, filename, or size field,
    /// or carries only one half of a checksum pair.
    #[error("MISSING {field} PARAMETER")]
    MissingRequiredField { field: String },

    #[error("INVALID FILE_TYPE PARAMETER : {0}")]
    InvalidFileType(String),

    /// Checksum value with the wrong PVL type, e.g. a quoted CKSUM or a
    /// bare-number MD5.
    #[error("Expected {checksum_type} value to be a {want}: {value}")]
    InvalidChecksumValue {
        checksum_type: String,
        want: &'static str,
        value: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
