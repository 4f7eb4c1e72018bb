//! Error types for the TSF reader wrapper.

use std::fmt;

use thiserror::Error;

/// Message text reported by `tsf_get_last_error_string`, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryMessage(String);

impl LibraryMessage {
    /// Wrap a message string.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// Decode the raw bytes filled in by the library.
    ///
    /// Everything from the first NUL byte on is dropped; invalid UTF-8 is
    /// replaced rather than rejected.
    pub fn from_c_bytes(bytes: &[u8]) -> Self {
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Self(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }

    /// The message text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LibraryMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors that can occur while opening or reading a TSF analysis.
#[derive(Error, Debug)]
pub enum TsfError {
    /// `tsf_open` returned the null handle
    #[error("Failed to open TSF analysis: {0}")]
    Open(LibraryMessage),

    /// A spectrum read reported a required length of zero
    #[error("Spectrum read error: {0}")]
    Read(LibraryMessage),

    /// Conversion input has more values than the C interface can address
    #[error("Input range too large: {len} values (maximum {max})", max = u32::MAX)]
    InputTooLarge {
        /// Number of values passed in
        len: usize,
    },

    /// The library kept asking for a larger buffer
    #[error("Buffer negotiation did not settle after {attempts} attempts (last required length {required})")]
    BufferNegotiation {
        /// Last length the library asked for
        required: usize,
        /// Number of read calls issued
        attempts: usize,
    },

    /// Path cannot be handed to the C interface
    #[error("Invalid analysis path: {0}")]
    InvalidPath(String),

    /// The vendor library or one of its symbols could not be loaded
    #[error("Failed to load timsdata library: {0}")]
    Library(#[from] libloading::Error),
}

impl TsfError {
    /// The library's own message for `Open` and `Read` failures.
    pub fn library_message(&self) -> Option<&str> {
        match self {
            TsfError::Open(message) | TsfError::Read(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TsfError>;
