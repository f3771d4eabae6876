//! Error types for the ServoCal firmware.
//!
//! None of these are fatal: the control loop has no caller to escalate to,
//! so every variant is resolved by the phase that observed it (usually by
//! treating the data as absent and recalibrating). All variants are `Copy`
//! so they can be logged and dropped without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Persisted record errors
// ---------------------------------------------------------------------------

/// Why a stored calibration record was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordError {
    /// The two tag bytes at the start of the record did not match.
    BadTag,
    /// The record was written by a layout this firmware does not understand.
    UnsupportedVersion(u8),
    /// The length byte points past the end of the record area.
    Oversize(u8),
    /// The payload could not be decoded.
    Corrupted,
    /// A decoded field lies outside the valid pulse range.
    OutOfRange { field: &'static str, value: u16 },
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadTag => write!(f, "record tag mismatch"),
            Self::UnsupportedVersion(v) => write!(f, "unsupported record version {v}"),
            Self::Oversize(len) => write!(f, "record payload length {len} too large"),
            Self::Corrupted => write!(f, "record payload corrupted"),
            Self::OutOfRange { field, value } => {
                write!(f, "{field}={value} outside valid pulse range")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from [`ServoConfig::validate`](crate::config::ServoConfig::validate).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// The configuration document could not be parsed.
    Malformed,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
            Self::Malformed => write!(f, "configuration is not valid JSON"),
        }
    }
}

impl core::error::Error for RecordError {}
impl core::error::Error for ConfigError {}
