// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for codec derivation, serialization and decoding.
//!
//! Two layers exist:
//!
//! - [`Error`] is what escapes a public call. Only a handful of conditions are
//!   fatal: an unpermitted shape, a reference loop under
//!   `ReferenceLoopHandling::Error`, invalid settings, and I/O while loading
//!   settings files.
//! - [`DecodeError`] is the per-field signal consumed by the resilient record
//!   decoder. `Truncated` stops the current record, `Malformed` triggers field
//!   recovery, and `Fatal` wraps an [`Error`] that must reach the caller.

use std::fmt;

/// Error surfaced by the public API.
#[derive(Debug)]
pub enum Error {
    // ========================================================================
    // Registry Errors
    // ========================================================================
    /// Shape is not on the registry allow-list (nor an array or enumeration).
    NotPermitted { type_name: &'static str },
    /// A deferred codec was used after its registry was dropped.
    Unresolved { type_name: &'static str },

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// Direct self-referential field met with `ReferenceLoopHandling::Error`.
    ReferenceLoop {
        type_name: &'static str,
        field: String,
    },
    /// Value handed to a codec is not of the codec's shape.
    TypeMismatch { expected: &'static str },
    /// String or array longer than a `u32` length prefix can describe.
    LengthOverflow { len: usize },
    /// Top-level decode could not produce a value at all.
    Decode { offset: usize, reason: String },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Settings combination rejected at the API boundary.
    InvalidSettings(String),
    /// Settings document could not be parsed or a profile is missing.
    Config(String),
    /// I/O error with underlying cause.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Registry
            Error::NotPermitted { type_name } => {
                write!(f, "Type not permitted for serialization: {}", type_name)
            }
            Error::Unresolved { type_name } => {
                write!(f, "Codec for {} is no longer resolvable", type_name)
            }
            // Serialization
            Error::ReferenceLoop { type_name, field } => write!(
                f,
                "Reference loop detected on {}.{} (ReferenceLoopHandling::Error)",
                type_name, field
            ),
            Error::TypeMismatch { expected } => write!(f, "Type mismatch: expected {}", expected),
            Error::LengthOverflow { len } => {
                write!(f, "Length {} does not fit a u32 length prefix", len)
            }
            Error::Decode { offset, reason } => {
                write!(f, "Decode failed at offset {}: {}", offset, reason)
            }
            // Configuration
            Error::InvalidSettings(msg) => write!(f, "Invalid settings: {}", msg),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

/// Convenient alias for results using the crate [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

/// Outcome of a single decode attempt inside a record.
#[derive(Debug)]
pub enum DecodeError {
    /// End of stream reached before the value was complete.
    Truncated { offset: usize },
    /// Bytes present but not a valid encoding of the expected shape.
    Malformed { offset: usize, reason: String },
    /// Unrecoverable condition; propagated to the caller unchanged.
    Fatal(Error),
}

impl DecodeError {
    pub fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        DecodeError::Malformed {
            offset,
            reason: reason.into(),
        }
    }

    /// True when the failure is local to one field and may be skipped.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DecodeError::Malformed { .. })
    }

    /// Convert into the public error for a top-level (non-record) decode.
    pub fn into_error(self) -> Error {
        match self {
            DecodeError::Truncated { offset } => Error::Decode {
                offset,
                reason: "unexpected end of buffer".into(),
            },
            DecodeError::Malformed { offset, reason } => Error::Decode { offset, reason },
            DecodeError::Fatal(e) => e,
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Truncated { offset } => {
                write!(f, "truncated at offset {}: unexpected end of buffer", offset)
            }
            DecodeError::Malformed { offset, reason } => {
                write!(f, "malformed at offset {}: {}", offset, reason)
            }
            DecodeError::Fatal(e) => write!(f, "fatal: {}", e),
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<Error> for DecodeError {
    fn from(e: Error) -> Self {
        DecodeError::Fatal(e)
    }
}

pub type DecodeResult<T> = core::result::Result<T, DecodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_variants() {
        let err = Error::NotPermitted {
            type_name: "demo::Secret",
        };
        assert_eq!(
            err.to_string(),
            "Type not permitted for serialization: demo::Secret"
        );

        let err = Error::ReferenceLoop {
            type_name: "demo::Node",
            field: "next".into(),
        };
        assert_eq!(
            err.to_string(),
            "Reference loop detected on demo::Node.next (ReferenceLoopHandling::Error)"
        );

        let err = Error::InvalidSettings("binary + configuration".into());
        assert_eq!(err.to_string(), "Invalid settings: binary + configuration");
    }

    #[test]
    fn test_decode_error_recoverability() {
        assert!(DecodeError::malformed(3, "bad bool").is_recoverable());
        assert!(!DecodeError::Truncated { offset: 9 }.is_recoverable());
        assert!(!DecodeError::Fatal(Error::TypeMismatch { expected: "u32" }).is_recoverable());
    }

    #[test]
    fn test_decode_error_into_error_keeps_offset() {
        match (DecodeError::Truncated { offset: 7 }).into_error() {
            Error::Decode { offset, reason } => {
                assert_eq!(offset, 7);
                assert_eq!(reason, "unexpected end of buffer");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_io_error_source_is_exposed() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert!(std::error::Error::source(&err).is_some());
    }
}
