//! Whole-file detail extraction with the growing-prefix strategy.
//!
//! The replay header has no recorded length, so a caller cannot know
//! up-front how many bytes to read before parsing. Rather than streaming,
//! this module retries: read a prefix, attempt a full parse, and on
//! [`crate::error::ParserError::Truncated`] double the prefix and try again. Each
//! attempt is a fresh, side-effect-free parse; no resumable parser state
//! exists between retries.
//!
//! The final duration is then recovered through the footer fast path:
//! the file's last 4 bytes hold the footer length, so only
//! `footer length + 4` tail bytes need to be read for
//! [`extract_final_timecode`], with no full-file scan.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::footer::extract_final_timecode;
use crate::format::TERMINATOR;
use crate::header::ReplayHeader;

/// Everything shown for one replay in a listing: its parsed header and,
/// when the footer is intact, the final match duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayDetails {
    /// The parsed replay header.
    pub header: ReplayHeader,

    /// Final timecode from the footer; `None` for truncated files.
    ///
    /// Absence is expected, not an error: it marks the replays that
    /// [`crate::repair::repair_replay`] exists to fix.
    pub final_timecode: Option<u32>,
}

/// The smallest prefix attempted by the growing-prefix loop.
const INITIAL_PREFIX: usize = 1024;

/// Reads a replay file's details from disk.
///
/// The header is parsed from progressively larger prefixes of the file
/// (starting at 1 KiB, doubling each retry) until it parses or the whole
/// file has been read. The duration comes from the footer fast path and is
/// best-effort.
///
/// # Errors
///
/// - [`crate::error::ParserError::Io`] if the file cannot be opened or read
/// - Any [`ReplayHeader::parse`] error; [`crate::error::ParserError::Truncated`] here
///   means even the complete file ends inside the header
///
/// # Example
///
/// ```no_run
/// use ra3_parser::details::read_details;
///
/// let details = read_details("match.RA3Replay").unwrap();
/// println!("{} players", details.header.players.len());
/// match details.final_timecode {
///     Some(frames) => println!("duration: {frames} frames"),
///     None => println!("truncated replay, needs repair"),
/// }
/// ```
pub fn read_details<P: AsRef<Path>>(path: P) -> Result<ReplayDetails> {
    let mut file = File::open(path)?;
    let file_size = usize::try_from(file.metadata()?.len()).unwrap_or(usize::MAX);

    let mut buffer = Vec::new();
    let header = loop {
        let remaining = file_size - buffer.len();
        let grow = (buffer.len() * 2).max(INITIAL_PREFIX).min(remaining);
        let old_len = buffer.len();
        buffer.resize(old_len + grow, 0);
        file.read_exact(&mut buffer[old_len..])?;

        match ReplayHeader::parse(&buffer) {
            Ok(header) => break header,
            Err(err) if err.is_truncation() && buffer.len() < file_size => {}
            Err(err) => return Err(err),
        }
    };

    let final_timecode = read_tail_timecode(&mut file, file_size as u64);

    Ok(ReplayDetails {
        header,
        final_timecode,
    })
}

/// Footer fast path: reads only the tail of the file and extracts the
/// final timecode from it. Any failure reads as "duration unknown".
fn read_tail_timecode(file: &mut File, file_size: u64) -> Option<u32> {
    if file_size < 4 {
        return None;
    }
    file.seek(SeekFrom::End(-4)).ok()?;
    let mut length_bytes = [0u8; 4];
    file.read_exact(&mut length_bytes).ok()?;
    let footer_length = u64::from(u32::from_le_bytes(length_bytes));

    // The tail handed to the extractor starts at the terminator sentinel.
    let tail_len = footer_length + TERMINATOR.len() as u64;
    if tail_len > file_size {
        return None;
    }

    file.seek(SeekFrom::End(-(tail_len as i64))).ok()?;
    let mut tail = vec![0u8; tail_len as usize];
    file.read_exact(&mut tail).ok()?;
    extract_final_timecode(&tail)
}
