//! Container constants and quick format detection.
//!
//! This module collects the magic literals and fixed sizes of the two
//! binary formats handled by this crate:
//!
//! - **Replay container** (`.RA3Replay`): a versioned header, a stream of
//!   framed event chunks, a 4-byte terminator sentinel, and an optional
//!   footer recording the final match duration.
//! - **CSF string table** (`.csf`): label/text pairs in masked UTF-16.
//!
//! All multi-byte integers in both formats are little-endian.

/// The magic string at the start of every replay file (17 bytes).
pub const REPLAY_HEADER_MAGIC: &[u8; 17] = b"RA3 REPLAY HEADER";

/// The embedded sub-container magic inside the replay header (8 bytes,
/// including the trailing NUL).
pub const CNC_MAGIC: &[u8; 8] = b"CNC3RPL\0";

/// The 4-byte sentinel that terminates the event-chunk stream.
///
/// This value is read from the timecode slot of the next chunk; it is not
/// itself a chunk.
pub const TERMINATOR: &[u8; 4] = b"\xFF\xFF\xFF\x7F";

/// The magic string at the start of the replay footer (17 bytes).
pub const FOOTER_MAGIC: &[u8; 17] = b"RA3 REPLAY FOOTER";

/// The flag bytes written after the final timecode in a synthesized footer.
pub const FOOTER_FLAGS: &[u8; 5] = b"\x02\x1A\x00\x00\x00";

/// Size of the fixed mod-info block in the replay header.
pub const MOD_INFO_SIZE: usize = 22;

/// Number of padding bytes between the header timestamp and the
/// plaintext-length field.
pub const PRE_PLAINTEXT_PADDING: usize = 31;

/// Marker substring inside the header's plaintext block that indicates a
/// commentary track.
pub const COMMENTATOR_MARKER: &str = ":Hpost Commentator";

/// File extension used by Red Alert 3 replay files.
pub const REPLAY_EXTENSION: &str = ".RA3Replay";

/// The magic string at the start of a CSF string-table file.
pub const CSF_MAGIC: &[u8; 4] = b" FSC";

/// The CSF container version tag following the magic.
pub const CSF_VERSION: u32 = 3;

/// The magic string introducing each CSF label.
pub const CSF_LABEL_MAGIC: &[u8; 4] = b" LBL";

/// The version tag following each label magic.
pub const CSF_LABEL_VERSION: u32 = 1;

/// The magic string introducing each CSF text payload.
pub const CSF_TEXT_MAGIC: &[u8; 4] = b" RTS";

/// Returns `true` if `data` begins with the replay header magic.
///
/// This is a cheap sniff, not a validation: a `true` result only means the
/// file is worth handing to [`crate::header::ReplayHeader::parse`].
///
/// # Example
///
/// ```
/// use ra3_parser::format::is_replay;
///
/// assert!(is_replay(b"RA3 REPLAY HEADER\x05..."));
/// assert!(!is_replay(b"RA3 REPLAY FOOTER"));
/// assert!(!is_replay(b"RA3"));
/// ```
#[must_use]
pub fn is_replay(data: &[u8]) -> bool {
    data.len() >= REPLAY_HEADER_MAGIC.len() && &data[..REPLAY_HEADER_MAGIC.len()] == REPLAY_HEADER_MAGIC
}
