//! Replay header parser.
//!
//! An `.RA3Replay` file opens with a variable-length header: a magic
//! string, version fields, four null-terminated UTF-16 strings, a player
//! list, an embedded `CNC3RPL\0` sub-container, a fixed mod-info block, a
//! timestamp, and a plaintext block. The header ends with a skip to the
//! "body offset" recorded inside it, which is where the event-chunk stream
//! begins.
//!
//! # Field order
//!
//! | Field | Size | Notes |
//! |-------|------|-------|
//! | magic | 17 | `"RA3 REPLAY HEADER"` |
//! | format variant | 1 | `5` adds one extra byte per player entry |
//! | major, minor version | 4 + 4 | |
//! | build major/minor, flags | 4 + 4 + 1 + 1 | skipped |
//! | title, description, map name, map id | var | null-terminated UTF-16LE |
//! | player count `n` | 1 | |
//! | player entries | var | `n + 1` of id(4) + name; last one dropped |
//! | body offset | 4 | counted from the start of `CNC3RPL\0` |
//! | sub-magic length | 4 | must equal 8 |
//! | `CNC3RPL\0` | 8 | |
//! | mod info | 22 | null-padded name + trailing version run |
//! | timestamp | 4 | UNIX seconds |
//! | padding | 31 | |
//! | plaintext length + plaintext | 4 + var | scanned for commentator marker |
//! | fill | var | skipped up to body offset |
//!
//! The parse is a single forward pass; any short read or wrong magic
//! aborts the whole parse with a positioned error. There is no partial
//! result.

use serde::Serialize;

use crate::cursor::ByteCursor;
use crate::error::{ParserError, Result};
use crate::format::{
    CNC_MAGIC, COMMENTATOR_MARKER, MOD_INFO_SIZE, PRE_PLAINTEXT_PADDING, REPLAY_HEADER_MAGIC,
};

/// The format-variant tag that adds one extra byte to each player entry.
pub const EXTENDED_PLAYER_VARIANT: u8 = 0x05;

/// Parsed metadata from a replay header.
///
/// All strings are decoded lossily from UTF-16LE: player and map names in
/// the wild contain arbitrary code units, and an unpaired surrogate should
/// not make the whole replay unreadable.
///
/// # Example
///
/// ```no_run
/// use ra3_parser::header::ReplayHeader;
///
/// let data = std::fs::read("match.RA3Replay").unwrap();
/// let header = ReplayHeader::parse(&data).unwrap();
/// println!("{} on {}", header.title, header.map_name);
/// for player in &header.players {
///     println!("  {player}");
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayHeader {
    /// The 1-byte format-variant tag following the magic.
    pub format_variant: u8,

    /// Game version as (major, minor).
    pub game_version: (u32, u32),

    /// Match title.
    pub title: String,

    /// Match description.
    pub description: String,

    /// Display name of the map.
    pub map_name: String,

    /// Internal map identifier.
    pub map_id: String,

    /// Player names, exactly as many as the header's player count.
    ///
    /// The file stores one extra unnamed entry (the observer slot); it is
    /// dropped during parsing.
    pub players: Vec<String>,

    /// Mod name from the fixed mod-info block, e.g. `"RA3"`.
    pub mod_name: String,

    /// Mod version from the tail of the mod-info block, e.g. `"1.12"`.
    pub mod_version: String,

    /// UNIX timestamp of the match.
    pub timestamp: u32,

    /// Whether the plaintext block carries the commentary-track marker.
    pub has_commentator: bool,

    /// Offset from the start of `CNC3RPL\0` to the first event chunk.
    pub body_offset: u32,
}

impl ReplayHeader {
    /// Parses a replay header from the start of `data`.
    ///
    /// `data` may be a prefix of the file; if it ends before the header
    /// does, the parse fails with [`ParserError::Truncated`] and can be
    /// retried with a larger prefix (see [`crate::details`]).
    ///
    /// # Errors
    ///
    /// - [`ParserError::Truncated`] if `data` ends inside the header
    /// - [`ParserError::MagicMismatch`] on a wrong leading or `CNC3RPL\0` magic
    /// - [`ParserError::InvalidHeader`] if the sub-magic length field is not
    ///   8, or the body offset is smaller than the bytes already consumed
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(data);
        Self::parse_from(&mut cursor)
    }

    /// Parses a header from `cursor`, leaving it positioned at the first
    /// event chunk.
    ///
    /// This is the entry point used by [`crate::repair`], which needs the
    /// final cursor position to know where the chunk stream starts.
    ///
    /// # Errors
    ///
    /// Same as [`ReplayHeader::parse`].
    pub(crate) fn parse_from(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        cursor.expect_magic(REPLAY_HEADER_MAGIC)?;

        let format_variant = cursor.read_u8()?;

        let major = cursor.read_u32_le()?;
        let minor = cursor.read_u32_le()?;

        cursor.skip(4)?; // build major
        cursor.skip(4)?; // build minor
        cursor.skip(1)?; // commentary track flag
        cursor.skip(1)?; // zero

        let title = read_wide_string(cursor)?;
        let description = read_wide_string(cursor)?;
        let map_name = read_wide_string(cursor)?;
        let map_id = read_wide_string(cursor)?;

        let player_count = cursor.read_u8()? as usize;

        // One extra entry follows the declared players: an unnamed
        // observer slot that is never a real player.
        let mut players = Vec::with_capacity(player_count + 1);
        for _ in 0..=player_count {
            cursor.skip(4)?; // player id
            players.push(read_wide_string(cursor)?);
            if format_variant == EXTENDED_PLAYER_VARIANT {
                cursor.skip(1)?; // team number
            }
        }
        players.pop();

        let body_offset = cursor.read_u32_le()?;

        let sub_magic_len = cursor.read_u32_le()?;
        if sub_magic_len as usize != CNC_MAGIC.len() {
            return Err(ParserError::InvalidHeader {
                reason: format!("incorrect CNC3RPL magic length: {sub_magic_len}"),
            });
        }
        cursor.expect_magic(CNC_MAGIC)?;

        let mod_info = cursor.read_bytes(MOD_INFO_SIZE)?;
        let (mod_name, mod_version) = split_mod_info(mod_info);

        let timestamp = cursor.read_u32_le()?;

        cursor.skip(PRE_PLAINTEXT_PADDING)?;

        let plaintext_len = cursor.read_u32_le()? as usize;
        let plaintext = cursor.read_bytes(plaintext_len)?;
        let has_commentator = contains_subslice(plaintext, COMMENTATOR_MARKER.as_bytes());

        // The body offset counts from the start of CNC3RPL\0; skip whatever
        // of that span the fields above have not already consumed.
        let consumed = CNC_MAGIC.len()
            + MOD_INFO_SIZE
            + 4 // timestamp
            + PRE_PLAINTEXT_PADDING
            + 4 // plaintext length
            + plaintext_len;
        let Some(fill) = (body_offset as usize).checked_sub(consumed) else {
            return Err(ParserError::InvalidHeader {
                reason: format!("body offset {body_offset} smaller than {consumed} consumed bytes"),
            });
        };
        cursor.skip(fill)?;

        Ok(ReplayHeader {
            format_variant,
            game_version: (major, minor),
            title,
            description,
            map_name,
            map_id,
            players,
            mod_name,
            mod_version,
            timestamp,
            has_commentator,
            body_offset,
        })
    }
}

/// Reads a null-terminated UTF-16LE string and decodes it lossily.
fn read_wide_string(cursor: &mut ByteCursor<'_>) -> Result<String> {
    let units = cursor.read_wide_cstring()?;
    Ok(String::from_utf16_lossy(&units))
}

/// Splits the 22-byte mod-info block into mod name and mod version.
///
/// The name is the prefix up to the first NUL. The version is the final
/// run of non-NUL bytes: everything after the last NUL that precedes the
/// last non-NUL byte.
fn split_mod_info(block: &[u8]) -> (String, String) {
    let name_end = block.iter().position(|&b| b == 0).unwrap_or(block.len());
    let name = String::from_utf8_lossy(&block[..name_end]).into_owned();

    let version = match block.iter().rposition(|&b| b != 0) {
        Some(last) => {
            let start = block[..=last]
                .iter()
                .rposition(|&b| b == 0)
                .map_or(0, |nul| nul + 1);
            String::from_utf8_lossy(&block[start..=last]).into_owned()
        }
        None => String::new(),
    };

    (name, version)
}

/// Returns `true` if `haystack` contains `needle` as a contiguous subslice.
fn contains_subslice(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
