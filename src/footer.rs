//! Replay footer tail extraction.
//!
//! A finished replay ends with the chunk-stream terminator followed by a
//! footer: the `"RA3 REPLAY FOOTER"` magic, the final timecode (the match
//! duration in frames), some flag bytes, and a length field stored as the
//! *last* 4 bytes of the file. Because the length is at the very end, the
//! duration can be recovered by reading only the tail of a file: read the
//! final 4 bytes, seek back `length + 4` bytes, and hand that slice to
//! [`extract_final_timecode`].
//!
//! Games that crash mid-write leave no footer at all; extraction is
//! therefore best-effort and reports absence instead of an error.

use crate::cursor::ByteCursor;
use crate::error::{ParserError, Result};
use crate::format::{FOOTER_MAGIC, TERMINATOR};

/// Recovers the final timecode from a replay's tail bytes.
///
/// `tail` must start at the terminator sentinel and run to the end of the
/// file. Returns `None` if the footer is missing, malformed, or its stored
/// length does not account for the bytes actually present; this path never
/// fails upward.
///
/// # Example
///
/// ```
/// use ra3_parser::footer::extract_final_timecode;
///
/// let mut tail = Vec::new();
/// tail.extend_from_slice(b"\xFF\xFF\xFF\x7F");     // terminator
/// tail.extend_from_slice(b"RA3 REPLAY FOOTER");    // footer magic
/// tail.extend_from_slice(&5400u32.to_le_bytes());  // final timecode
/// tail.extend_from_slice(b"\x02\x1A\x00\x00\x00"); // flags
/// tail.extend_from_slice(&30u32.to_le_bytes());    // footer length
///
/// assert_eq!(extract_final_timecode(&tail), Some(5400));
/// assert_eq!(extract_final_timecode(b"garbage"), None);
/// ```
#[must_use]
pub fn extract_final_timecode(tail: &[u8]) -> Option<u32> {
    extract(tail).ok()
}

/// Fallible core of [`extract_final_timecode`].
fn extract(tail: &[u8]) -> Result<u32> {
    let mut cursor = ByteCursor::new(tail);

    cursor.expect_magic(TERMINATOR)?;
    cursor.expect_magic(FOOTER_MAGIC)?;

    let final_timecode = cursor.read_u32_le()?;

    // Everything after the timecode, including the trailing length field.
    let remainder = cursor.rest();
    if remainder.len() < 4 {
        return Err(ParserError::truncated(4, remainder.len()));
    }

    // The length field is the last 4 bytes of the file, not the next 4;
    // read it through a fresh cursor over that sub-range.
    let mut length_cursor = ByteCursor::new(&remainder[remainder.len() - 4..]);
    let stored = length_cursor.read_u32_le()?;

    let actual = FOOTER_MAGIC.len() + 4 + remainder.len();
    if stored as usize != actual {
        return Err(ParserError::InconsistentFooterLength {
            stored,
            actual: u32::try_from(actual).unwrap_or(u32::MAX),
        });
    }

    Ok(final_timecode)
}
