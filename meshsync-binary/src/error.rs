//! Error types for the MeshSync wire format

use thiserror::Error;

/// Result type for MeshSync binary operations
pub type Result<T> = std::result::Result<T, BinaryError>;

/// Errors that can occur while encoding or decoding messages
#[derive(Error, Debug)]
pub enum BinaryError {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Not enough data
    #[error("Not enough data: expected {expected}, got {actual}")]
    NotEnoughData { expected: usize, actual: usize },

    /// Structurally invalid payload
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Presence flag set for an array that came back empty
    #[error("Flag mismatch: {field} is flagged present but has no elements")]
    FlagMismatch { field: &'static str },

    /// Message tag that names no known message
    #[error("Unknown message type: {0}")]
    UnknownMessageType(u32),

    /// String payload that is not valid UTF-8
    #[error("Invalid UTF-8 string: {0}")]
    InvalidUtf8(String),

    /// Bytes left over after a complete message
    #[error("{0} trailing bytes after message")]
    TrailingData(usize),

    /// Payload or array too long for a `u32` length field
    #[error("Length {0} exceeds the u32 wire limit")]
    TooLarge(usize),
}

impl BinaryError {
    /// Create a new invalid format error
    pub fn invalid_format<S: Into<String>>(msg: S) -> Self {
        Self::InvalidFormat(msg.into())
    }

    /// Create a new not enough data error
    pub fn not_enough_data(expected: usize, actual: usize) -> Self {
        Self::NotEnoughData { expected, actual }
    }

    /// Create a new flag mismatch error
    pub fn flag_mismatch(field: &'static str) -> Self {
        Self::FlagMismatch { field }
    }

    /// Create a new too large error
    pub fn too_large(len: usize) -> Self {
        Self::TooLarge(len)
    }

    /// True when the input simply ended early, as opposed to being malformed
    pub fn is_truncation(&self) -> bool {
        match self {
            BinaryError::NotEnoughData { .. } => true,
            BinaryError::Io(err) => err.kind() == std::io::ErrorKind::UnexpectedEof,
            _ => false,
        }
    }
}

impl From<std::string::FromUtf8Error> for BinaryError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::InvalidUtf8(err.to_string())
    }
}
