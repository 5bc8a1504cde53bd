//! Error types for decoder contract violations
//!
//! Malformed input data never produces an error: it is reported in-line as
//! warning rows. These errors only describe callers breaking the API contract.

use thiserror::Error;

/// Decoder error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Cursor window extends past the end of the supplied buffer
    #[error("cursor overrun: offset {offset} + remaining {remaining} exceeds buffer length {len}")]
    CursorOverrun {
        offset: usize,
        remaining: usize,
        len: usize,
    },

    /// Strict description lookup on a byte the protocol never assigned
    #[error("tag 0x{0:02X} is not registered")]
    UnknownTag(u8),
}

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, Error>;
