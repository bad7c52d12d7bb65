//! Chunk-stream validation and replay repair.
//!
//! After the header, a replay is an ordered stream of framed event chunks:
//!
//! ```text
//! chunk: timecode(4) | type(1) | payloadSize(4) | payload | 00 00 00 00
//! ```
//!
//! The stream ends when the 4 bytes in the timecode slot equal the
//! terminator sentinel `FF FF FF 7F`. A healthy file then carries a footer
//! recording the final match duration; a game that crashed mid-write
//! leaves the footer truncated or missing entirely. Such files confuse the
//! game's own replay browser even though every event survived.
//!
//! [`repair_replay`] rebuilds a structurally valid file: the header and
//! every well-formed chunk are copied through byte-for-byte, and the
//! footer is either passed through (when it already validates) or
//! synthesized with the last chunk's timecode standing in for the lost
//! final duration. Corruption *before* the terminator is fatal: chunk
//! boundaries cannot be inferred from broken framing, so there is nothing
//! safe to copy.

use serde::Serialize;

use crate::cursor::ByteCursor;
use crate::error::Result;
use crate::footer::extract_final_timecode;
use crate::format::{FOOTER_FLAGS, FOOTER_MAGIC, TERMINATOR};
use crate::header::ReplayHeader;

/// The 4 zero bytes that close every chunk.
pub const CHUNK_TRAILER: [u8; 4] = [0, 0, 0, 0];

/// One framed event record from the replay body.
///
/// Payload contents are opaque to this crate; only the framing (timecode,
/// type tag, size, zero trailer) is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Timecode of the event, in frames since match start.
    pub timecode: u32,
    /// Type tag of the chunk.
    pub kind: u8,
    /// Raw payload bytes, borrowed from the input buffer.
    pub payload: &'a [u8],
}

impl Chunk<'_> {
    /// Appends this chunk's wire representation to `out`.
    ///
    /// The output is byte-identical to the input the chunk was read from.
    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.timecode.to_le_bytes());
        out.push(self.kind);
        let size = u32::try_from(self.payload.len()).unwrap_or(u32::MAX);
        out.extend_from_slice(&size.to_le_bytes());
        out.extend_from_slice(self.payload);
        out.extend_from_slice(&CHUNK_TRAILER);
    }
}

/// Reads the next chunk, or `None` if the terminator sentinel is next.
///
/// On `None` the cursor has consumed the terminator. Any framing violation
/// (short read, non-zero trailer) fails.
fn read_chunk<'a>(cursor: &mut ByteCursor<'a>) -> Result<Option<Chunk<'a>>> {
    let stamp = cursor.read_array::<4>()?;
    if stamp == *TERMINATOR {
        return Ok(None);
    }

    let timecode = u32::from_le_bytes(stamp);
    let kind = cursor.read_u8()?;
    let size = cursor.read_u32_le()?;
    let payload = cursor.read_bytes(size as usize)?;
    cursor.expect_magic(&CHUNK_TRAILER)?;

    Ok(Some(Chunk {
        timecode,
        kind,
        payload,
    }))
}

/// Repairs a replay file, returning a complete output buffer that always
/// ends in a structurally valid footer.
///
/// The header and every chunk are validated and copied verbatim. After the
/// terminator, the remaining tail bytes are kept unchanged if
/// [`extract_final_timecode`] accepts them; otherwise a replacement footer
/// is synthesized carrying the last chunk's timecode as the recovered
/// duration (an approximation: the true final duration died with the
/// original footer).
///
/// # Errors
///
/// - Any [`ReplayHeader::parse`] error for a malformed header
/// - [`crate::error::ParserError::Truncated`] if the input ends before the
///   terminator
/// - [`crate::error::ParserError::MagicMismatch`] if a chunk trailer is not
///   four zero bytes
///
/// Pre-terminator corruption is fatal by design; only the footer is ever
/// repaired.
///
/// # Example
///
/// ```no_run
/// use ra3_parser::repair::repair_replay;
///
/// let data = std::fs::read("crashed.RA3Replay").unwrap();
/// let fixed = repair_replay(&data).unwrap();
/// std::fs::write("crashed_fixed.RA3Replay", fixed).unwrap();
/// ```
pub fn repair_replay(data: &[u8]) -> Result<Vec<u8>> {
    let mut cursor = ByteCursor::new(data);
    ReplayHeader::parse_from(&mut cursor)?;

    let mut out = Vec::with_capacity(data.len());
    out.extend_from_slice(&data[..cursor.position()]);

    let mut last_timecode = 0u32;
    while let Some(chunk) = read_chunk(&mut cursor)? {
        last_timecode = chunk.timecode;
        chunk.write_to(&mut out);
    }

    // The tail starts at the terminator the loop just consumed.
    let tail = &data[cursor.position() - TERMINATOR.len()..];
    if extract_final_timecode(tail).is_some() {
        out.extend_from_slice(tail);
    } else {
        out.extend_from_slice(&synthesize_footer(last_timecode));
    }

    Ok(out)
}

/// Builds a replacement tail: terminator, footer magic, final timecode,
/// flag bytes, and a length field consistent with the tail extractor.
fn synthesize_footer(final_timecode: u32) -> Vec<u8> {
    let mut footer = Vec::new();
    footer.extend_from_slice(TERMINATOR);
    footer.extend_from_slice(FOOTER_MAGIC);
    footer.extend_from_slice(&final_timecode.to_le_bytes());
    footer.extend_from_slice(FOOTER_FLAGS);

    // Length of everything from the footer magic through the length field
    // itself; stored as the last 4 bytes of the file.
    let length = (footer.len() - TERMINATOR.len() + 4) as u32;
    footer.extend_from_slice(&length.to_le_bytes());
    footer
}

/// Summary of a validated chunk stream, produced by [`scan_chunks`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamSummary {
    /// Number of well-formed chunks before the terminator.
    pub chunk_count: usize,
    /// Timecode of the last chunk, if any chunk was present.
    pub last_timecode: Option<u32>,
    /// Final timecode from the footer, if the footer validates.
    pub footer_timecode: Option<u32>,
}

/// Walks the whole replay without copying, validating header and chunk
/// framing and summarizing what was found.
///
/// This is the read-only counterpart of [`repair_replay`]: it fails on
/// exactly the same inputs, and `footer_timecode.is_none()` identifies the
/// files a repair would change.
///
/// # Errors
///
/// Same as [`repair_replay`].
pub fn scan_chunks(data: &[u8]) -> Result<StreamSummary> {
    let mut cursor = ByteCursor::new(data);
    ReplayHeader::parse_from(&mut cursor)?;

    let mut chunk_count = 0usize;
    let mut last_timecode = None;
    while let Some(chunk) = read_chunk(&mut cursor)? {
        chunk_count += 1;
        last_timecode = Some(chunk.timecode);
    }

    let tail = &data[cursor.position() - TERMINATOR.len()..];
    Ok(StreamSummary {
        chunk_count,
        last_timecode,
        footer_timecode: extract_final_timecode(tail),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParserError;

    /// Appends one well-formed chunk to `out`.
    fn push_chunk(out: &mut Vec<u8>, timecode: u32, kind: u8, payload: &[u8]) {
        out.extend_from_slice(&timecode.to_le_bytes());
        out.push(kind);
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(payload);
        out.extend_from_slice(&CHUNK_TRAILER);
    }

    // ========================
    // read_chunk tests
    // ========================

    #[test]
    fn test_read_chunk_basic() {
        let mut data = Vec::new();
        push_chunk(&mut data, 150, 0x01, b"\xAA\xBB");
        let mut cursor = ByteCursor::new(&data);
        let chunk = read_chunk(&mut cursor).unwrap().unwrap();
        assert_eq!(chunk.timecode, 150);
        assert_eq!(chunk.kind, 0x01);
        assert_eq!(chunk.payload, b"\xAA\xBB");
        assert!(cursor.at_end());
    }

    #[test]
    fn test_read_chunk_terminator() {
        let mut cursor = ByteCursor::new(TERMINATOR);
        assert!(read_chunk(&mut cursor).unwrap().is_none());
        assert!(cursor.at_end());
    }

    #[test]
    fn test_read_chunk_nonzero_trailer() {
        let mut data = Vec::new();
        push_chunk(&mut data, 150, 0x01, b"xy");
        let len = data.len();
        data[len - 2] = 0x01;
        let mut cursor = ByteCursor::new(&data);
        let result = read_chunk(&mut cursor);
        assert!(matches!(result, Err(ParserError::MagicMismatch { .. })));
    }

    #[test]
    fn test_read_chunk_truncated_payload() {
        let mut data = Vec::new();
        data.extend_from_slice(&10u32.to_le_bytes());
        data.push(0x01);
        data.extend_from_slice(&100u32.to_le_bytes()); // size larger than input
        data.extend_from_slice(b"short");
        let mut cursor = ByteCursor::new(&data);
        let result = read_chunk(&mut cursor);
        assert!(matches!(result, Err(ParserError::Truncated { .. })));
    }

    #[test]
    fn test_chunk_write_to_round_trips() {
        let mut data = Vec::new();
        push_chunk(&mut data, 42, 0x02, &[1, 2, 3, 4, 5]);
        let mut cursor = ByteCursor::new(&data);
        let chunk = read_chunk(&mut cursor).unwrap().unwrap();
        let mut rebuilt = Vec::new();
        chunk.write_to(&mut rebuilt);
        assert_eq!(rebuilt, data);
    }

    // ========================
    // synthesize_footer tests
    // ========================

    #[test]
    fn test_synthesized_footer_validates() {
        let footer = synthesize_footer(777);
        assert_eq!(extract_final_timecode(&footer), Some(777));
    }

    #[test]
    fn test_synthesized_footer_layout() {
        let footer = synthesize_footer(1);
        assert_eq!(footer.len(), TERMINATOR.len() + 30);
        assert_eq!(&footer[..4], TERMINATOR);
        assert_eq!(&footer[4..21], FOOTER_MAGIC);
        assert_eq!(&footer[21..25], &1u32.to_le_bytes());
        assert_eq!(&footer[25..30], FOOTER_FLAGS);
        assert_eq!(&footer[30..34], &30u32.to_le_bytes());
    }
}
