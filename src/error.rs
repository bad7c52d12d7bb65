//! Error types for the RA3 replay and CSF string-table parsers.
//!
//! This module defines the error hierarchy for all failure cases during
//! parsing: truncated input, magic-byte mismatches, malformed headers,
//! and redundant fields that disagree with each other.

use thiserror::Error;

/// The main error type for RA3 parsing operations.
///
/// This enum covers all error cases that can occur while decoding a
/// replay container or a CSF string table:
/// - File I/O failures (surfaced by the file-reading helpers)
/// - Truncated or incomplete data
/// - Magic bytes that do not match an expected literal
/// - Malformed header structures
/// - Redundantly-encoded fields that disagree
/// - Leftover bytes where exact consumption is required
///
/// # Example
///
/// ```
/// use ra3_parser::error::{ParserError, Result};
///
/// fn example_operation() -> Result<()> {
///     // Operations that may fail return Result<T>
///     Err(ParserError::InvalidHeader {
///         reason: "Missing required field".to_string(),
///     })
/// }
/// ```
#[derive(Error, Debug)]
pub enum ParserError {
    /// An I/O error occurred while reading a replay or CSF file.
    ///
    /// This wraps standard library I/O errors for seamless error propagation
    /// using the `?` operator.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The data ended before the required bytes could be read.
    ///
    /// During the growing-prefix header scan this is the signal to retry
    /// with a larger buffer; everywhere else it indicates a truncated file.
    #[error("Truncated input: expected {expected} bytes, but only {available} available")]
    Truncated {
        /// The number of bytes that were expected to be available.
        expected: usize,
        /// The actual number of bytes available.
        available: usize,
    },

    /// Bytes were present but did not match an expected magic literal.
    ///
    /// Unlike [`ParserError::Truncated`], this is never recoverable by
    /// supplying more input: the file is not in the expected format.
    #[error("Magic mismatch at offset {offset}: expected {expected}, found {found}")]
    MagicMismatch {
        /// The expected magic bytes (as hex string for display).
        expected: String,
        /// The actual bytes found (as hex string).
        found: String,
        /// The cursor position where the comparison started.
        offset: usize,
    },

    /// The replay header is malformed or contains invalid data.
    ///
    /// This error is returned when header fields fail validation checks,
    /// such as a body offset smaller than the bytes already consumed.
    #[error("Invalid header: {reason}")]
    InvalidHeader {
        /// A description of what makes the header invalid.
        reason: String,
    },

    /// The two redundant string-count fields of a CSF table disagree.
    ///
    /// The CSF format stores the entry count twice; any mismatch means the
    /// rest of the file cannot be trusted.
    #[error("Inconsistent CSF string count: {first} vs {second}")]
    InconsistentCount {
        /// The first count field.
        first: u32,
        /// The second count field.
        second: u32,
    },

    /// The footer's stored length does not describe the bytes actually present.
    ///
    /// During repair this is tolerated: a replacement footer is synthesized
    /// instead. Elsewhere it means the footer cannot be trusted.
    #[error("Inconsistent footer length: stored {stored}, actual {actual}")]
    InconsistentFooterLength {
        /// The length recorded in the footer's final 4 bytes.
        stored: u32,
        /// The length implied by the bytes actually present.
        actual: u32,
    },

    /// Bytes were left over at a point where exact consumption is required.
    ///
    /// A CSF table must account for every byte of its buffer; trailing
    /// garbage means the counts or sizes inside the file are wrong.
    #[error("Trailing data: {remaining} unconsumed bytes at end of input")]
    TrailingData {
        /// The number of unconsumed bytes.
        remaining: usize,
    },
}

impl ParserError {
    /// Creates a `MagicMismatch` error from the raw byte slices.
    ///
    /// The bytes are converted to hex strings for human-readable display.
    ///
    /// # Example
    ///
    /// ```
    /// use ra3_parser::error::ParserError;
    ///
    /// let err = ParserError::magic_mismatch(b" FSC", b"JUNK", 0);
    /// assert!(err.to_string().contains("Magic mismatch"));
    /// ```
    #[must_use]
    pub fn magic_mismatch(expected: &[u8], found: &[u8], offset: usize) -> Self {
        ParserError::MagicMismatch {
            expected: bytes_to_hex(expected),
            found: bytes_to_hex(found),
            offset,
        }
    }

    /// Creates a `Truncated` error with the given sizes.
    #[must_use]
    pub fn truncated(expected: usize, available: usize) -> Self {
        ParserError::Truncated { expected, available }
    }

    /// Returns `true` if this error means "supply more bytes and retry".
    ///
    /// Used by the growing-prefix header scan in [`crate::details`]: only
    /// a truncation is worth retrying with a larger prefix, every other
    /// failure is final.
    #[must_use]
    pub fn is_truncation(&self) -> bool {
        matches!(self, ParserError::Truncated { .. })
    }
}

/// Converts a byte slice to a hexadecimal string representation.
///
/// If the slice is 8 bytes or less, formats as space-separated hex values.
/// If longer, shows the first 8 bytes followed by "...".
fn bytes_to_hex(bytes: &[u8]) -> String {
    if bytes.len() <= 8 {
        bytes
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        let prefix: String = bytes[..8]
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(" ");
        format!("{prefix}... ({} bytes total)", bytes.len())
    }
}

/// A specialized Result type for RA3 parsing operations.
///
/// This is a convenience alias that uses `ParserError` as the error type.
pub type Result<T> = std::result::Result<T, ParserError>;
