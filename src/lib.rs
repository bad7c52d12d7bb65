//! # RA3 Parser
//!
//! A Red Alert 3 replay (`.RA3Replay`) and CSF string-table parser.
//!
//! This library decodes and repairs two proprietary EA container formats:
//!
//! - **Replay container**: versioned header, framed event-chunk stream,
//!   terminator sentinel, and a footer recording the final match duration.
//!   Games that crash mid-write truncate the footer; [`repair_replay`]
//!   reconstructs a valid one.
//! - **CSF string table**: localized label/text pairs stored as masked
//!   UTF-16 ([`StringTable`]).
//!
//! ## Quick Start
//!
//! ```no_run
//! use ra3_parser::{ReplayHeader, repair_replay};
//! use ra3_parser::error::Result;
//!
//! fn inspect(data: &[u8]) -> Result<()> {
//!     let header = ReplayHeader::parse(data)?;
//!     println!("{} on {}", header.title, header.map_name);
//!
//!     // Rebuild a structurally valid file (fixes truncated footers).
//!     let fixed = repair_replay(data)?;
//!     std::fs::write("fixed.RA3Replay", fixed)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`error`] - Error types and result alias for parser operations
//! - [`cursor`] - Bounded forward-only reader for little-endian data
//! - [`format`] - Container constants and quick format detection
//! - [`csf`] - CSF string-table decode/encode
//! - [`header`] - Replay header parsing
//! - [`repair`] - Chunk-stream validation and footer repair
//! - [`footer`] - Final-timecode extraction from a file's tail bytes
//! - [`details`] - Whole-file detail reads (growing-prefix header scan)
//!
//! All multi-byte integers in both formats are little-endian; every parse
//! is a synchronous pass over a caller-supplied buffer with no internal
//! I/O or shared state.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod csf;
pub mod cursor;
pub mod details;
pub mod error;
pub mod footer;
pub mod format;
pub mod header;
pub mod repair;

// Re-export commonly used types at the crate root
pub use csf::StringTable;
pub use cursor::ByteCursor;
pub use details::{read_details, ReplayDetails};
pub use error::{ParserError, Result};
pub use footer::extract_final_timecode;
pub use format::is_replay;
pub use header::ReplayHeader;
pub use repair::{repair_replay, scan_chunks, Chunk, StreamSummary};
