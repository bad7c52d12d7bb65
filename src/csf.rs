//! CSF string-table codec.
//!
//! Red Alert 3 stores its localized strings in `.csf` files: a flat
//! container of label/text pairs where each text is UTF-16LE with every
//! code unit XORed with `0xFFFF`. This module decodes such a file into a
//! [`StringTable`] and encodes a table back to bytes, byte-for-byte
//! compatible with the game's own files.
//!
//! # Wire format (all integers little-endian)
//!
//! ```text
//! " FSC" | version=3 | count | count | 0 | 0 | entry*count
//! entry: " LBL" | 1 | labelLen | label | " RTS" | charCount | charCount x u16
//! ```
//!
//! The entry count is stored twice; the two copies must be bit-for-bit
//! equal. Each stored code unit is `realChar XOR 0xFFFF`.
//!
//! # Example
//!
//! ```
//! use ra3_parser::csf::StringTable;
//!
//! let mut table = StringTable::new();
//! table.insert("GUI:OK", &[b'O' as u16, b'K' as u16]);
//!
//! let bytes = table.encode();
//! let decoded = StringTable::parse(&bytes).unwrap();
//! assert_eq!(decoded, table);
//! assert_eq!(decoded.get_text("gui:ok").as_deref(), Some("OK"));
//! ```

use std::collections::BTreeMap;

use crate::cursor::ByteCursor;
use crate::error::{ParserError, Result};
use crate::format::{CSF_LABEL_MAGIC, CSF_LABEL_VERSION, CSF_MAGIC, CSF_TEXT_MAGIC, CSF_VERSION};

/// The mask applied to every stored UTF-16 code unit.
///
/// Masking is its own inverse: applying it twice yields the original unit.
pub const CODE_UNIT_MASK: u16 = 0xFFFF;

/// A decoded CSF string table: a lookup-only mapping from label to text.
///
/// Labels are case-folded to lowercase ASCII on insert and on lookup, so
/// `get("GUI:OK")` and `get("gui:ok")` find the same entry. Texts are kept
/// as raw UTF-16 code units; the game's files may contain unpaired
/// surrogates, which a lossy [`StringTable::get_text`] renders as
/// replacement characters.
///
/// A table is built once from a file's full contents and treated as
/// immutable afterwards; loading a new language means building a new table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StringTable {
    entries: BTreeMap<String, Vec<u16>>,
}

impl StringTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        StringTable::default()
    }

    /// Decodes a complete CSF file.
    ///
    /// The buffer must contain exactly one table and nothing else: any
    /// leftover bytes after the last entry fail the parse.
    ///
    /// # Errors
    ///
    /// - [`ParserError::MagicMismatch`] on a wrong container/label/text
    ///   magic or version tag, or non-zero reserved fields
    /// - [`ParserError::InconsistentCount`] if the two count fields differ
    /// - [`ParserError::Truncated`] if the buffer ends mid-entry
    /// - [`ParserError::TrailingData`] if bytes remain after the last entry
    ///
    /// # Example
    ///
    /// ```
    /// use ra3_parser::csf::StringTable;
    ///
    /// let mut data = Vec::new();
    /// data.extend_from_slice(b" FSC\x03\x00\x00\x00");
    /// data.extend_from_slice(&1u32.to_le_bytes()); // count
    /// data.extend_from_slice(&1u32.to_le_bytes()); // count again
    /// data.extend_from_slice(&[0; 8]);             // reserved
    /// data.extend_from_slice(b" LBL\x01\x00\x00\x00");
    /// data.extend_from_slice(&3u32.to_le_bytes());
    /// data.extend_from_slice(b"ABC");
    /// data.extend_from_slice(b" RTS");
    /// data.extend_from_slice(&1u32.to_le_bytes());
    /// data.extend_from_slice(&(b'X' as u16 ^ 0xFFFF).to_le_bytes());
    ///
    /// let table = StringTable::parse(&data).unwrap();
    /// assert_eq!(table.get_text("abc").as_deref(), Some("X"));
    /// ```
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(data);

        cursor.expect_magic(CSF_MAGIC)?;
        cursor.expect_magic(&CSF_VERSION.to_le_bytes())?;

        let first_count = cursor.read_u32_le()?;
        let second_count = cursor.read_u32_le()?;
        if first_count != second_count {
            return Err(ParserError::InconsistentCount {
                first: first_count,
                second: second_count,
            });
        }

        // Two reserved fields, always zero in known files.
        cursor.expect_magic(&[0; 4])?;
        cursor.expect_magic(&[0; 4])?;

        let mut entries = BTreeMap::new();
        for _ in 0..first_count {
            let (label, text) = parse_entry(&mut cursor)?;
            entries.insert(label, text);
        }

        if !cursor.at_end() {
            return Err(ParserError::TrailingData {
                remaining: cursor.remaining(),
            });
        }

        Ok(StringTable { entries })
    }

    /// Encodes the table back into the CSF wire format.
    ///
    /// Both count fields are set to the entry count, the reserved fields to
    /// zero, and every code unit is masked before writing, so
    /// `StringTable::parse(&table.encode())` reproduces `table` exactly.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();

        out.extend_from_slice(CSF_MAGIC);
        out.extend_from_slice(&CSF_VERSION.to_le_bytes());
        let count = u32::try_from(self.entries.len()).unwrap_or(u32::MAX);
        out.extend_from_slice(&count.to_le_bytes());
        out.extend_from_slice(&count.to_le_bytes());
        out.extend_from_slice(&[0; 8]);

        for (label, text) in &self.entries {
            out.extend_from_slice(CSF_LABEL_MAGIC);
            out.extend_from_slice(&CSF_LABEL_VERSION.to_le_bytes());
            let label_len = u32::try_from(label.len()).unwrap_or(u32::MAX);
            out.extend_from_slice(&label_len.to_le_bytes());
            out.extend_from_slice(label.as_bytes());

            out.extend_from_slice(CSF_TEXT_MAGIC);
            let char_count = u32::try_from(text.len()).unwrap_or(u32::MAX);
            out.extend_from_slice(&char_count.to_le_bytes());
            for unit in text {
                out.extend_from_slice(&(unit ^ CODE_UNIT_MASK).to_le_bytes());
            }
        }

        out
    }

    /// Inserts an entry, replacing any existing entry with the same
    /// case-folded label.
    pub fn insert(&mut self, label: &str, text: &[u16]) {
        self.entries
            .insert(label.to_ascii_lowercase(), text.to_vec());
    }

    /// Looks up the raw UTF-16 code units for a label, case-insensitively.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&[u16]> {
        self.entries
            .get(&label.to_ascii_lowercase())
            .map(Vec::as_slice)
    }

    /// Looks up a label and decodes its text to a `String`.
    ///
    /// Unpaired surrogates become U+FFFD replacement characters.
    #[must_use]
    pub fn get_text(&self, label: &str) -> Option<String> {
        self.get(label).map(String::from_utf16_lossy)
    }

    /// The number of entries in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(label, code units)` pairs in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u16])> {
        self.entries
            .iter()
            .map(|(label, text)| (label.as_str(), text.as_slice()))
    }
}

/// Parses one ` LBL`/` RTS` entry, returning the case-folded label and the
/// unmasked code units.
fn parse_entry(cursor: &mut ByteCursor<'_>) -> Result<(String, Vec<u16>)> {
    cursor.expect_magic(CSF_LABEL_MAGIC)?;
    cursor.expect_magic(&CSF_LABEL_VERSION.to_le_bytes())?;

    let label_len = cursor.read_u32_le()? as usize;
    let label_bytes = cursor.read_bytes(label_len)?;
    let label = String::from_utf8_lossy(label_bytes).to_ascii_lowercase();

    cursor.expect_magic(CSF_TEXT_MAGIC)?;

    let char_count = cursor.read_u32_le()? as usize;
    let mut text = Vec::with_capacity(char_count.min(1 << 20));
    for _ in 0..char_count {
        text.push(cursor.read_u16_le()? ^ CODE_UNIT_MASK);
    }

    Ok((label, text))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Encodes `text` as masked UTF-16LE bytes.
    fn masked(text: &str) -> Vec<u8> {
        text.encode_utf16()
            .flat_map(|u| (u ^ CODE_UNIT_MASK).to_le_bytes())
            .collect()
    }

    /// Builds a well-formed single-entry CSF buffer.
    fn single_entry_buffer(label: &str, text: &str) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(b" FSC\x03\x00\x00\x00");
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&[0; 8]);
        data.extend_from_slice(b" LBL\x01\x00\x00\x00");
        data.extend_from_slice(&(label.len() as u32).to_le_bytes());
        data.extend_from_slice(label.as_bytes());
        data.extend_from_slice(b" RTS");
        data.extend_from_slice(&(text.encode_utf16().count() as u32).to_le_bytes());
        data.extend_from_slice(&masked(text));
        data
    }

    // ========================
    // decode tests
    // ========================

    #[test]
    fn test_parse_single_entry() {
        let data = single_entry_buffer("ABC", "Hi");
        let table = StringTable::parse(&data).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get_text("abc").as_deref(), Some("Hi"));
    }

    #[test]
    fn test_parse_empty_table() {
        let mut data = Vec::new();
        data.extend_from_slice(b" FSC\x03\x00\x00\x00");
        data.extend_from_slice(&[0; 16]);
        let table = StringTable::parse(&data).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let data = single_entry_buffer("GUI:MainMenu", "Menu");
        let table = StringTable::parse(&data).unwrap();
        assert_eq!(table.get_text("gui:mainmenu").as_deref(), Some("Menu"));
        assert_eq!(table.get_text("GUI:MAINMENU").as_deref(), Some("Menu"));
        assert!(table.get("gui:other").is_none());
    }

    #[test]
    fn test_parse_wrong_container_magic() {
        let data = b"CSF \x03\x00\x00\x00";
        let result = StringTable::parse(data);
        assert!(matches!(result, Err(ParserError::MagicMismatch { .. })));
    }

    #[test]
    fn test_parse_wrong_version() {
        let mut data = single_entry_buffer("ABC", "Hi");
        data[4] = 4;
        let result = StringTable::parse(&data);
        assert!(matches!(result, Err(ParserError::MagicMismatch { .. })));
    }

    #[test]
    fn test_parse_inconsistent_count() {
        let mut data = single_entry_buffer("ABC", "Hi");
        // Bump the second count field only.
        data[12] = 2;
        let result = StringTable::parse(&data);
        assert!(matches!(
            result,
            Err(ParserError::InconsistentCount { first: 1, second: 2 })
        ));
    }

    #[test]
    fn test_parse_nonzero_reserved_field() {
        let mut data = single_entry_buffer("ABC", "Hi");
        data[16] = 1;
        let result = StringTable::parse(&data);
        assert!(matches!(result, Err(ParserError::MagicMismatch { .. })));
    }

    #[test]
    fn test_parse_trailing_data() {
        let mut data = single_entry_buffer("ABC", "Hi");
        data.push(0x00);
        let result = StringTable::parse(&data);
        assert!(matches!(
            result,
            Err(ParserError::TrailingData { remaining: 1 })
        ));
    }

    #[test]
    fn test_parse_truncated_entry() {
        let data = single_entry_buffer("ABC", "Hi");
        let result = StringTable::parse(&data[..data.len() - 1]);
        assert!(matches!(result, Err(ParserError::Truncated { .. })));
    }

    #[test]
    fn test_parse_bad_label_magic() {
        let mut data = single_entry_buffer("ABC", "Hi");
        data[24] = b'X'; // corrupt " LBL"
        let result = StringTable::parse(&data);
        assert!(matches!(result, Err(ParserError::MagicMismatch { .. })));
    }

    #[test]
    fn test_parse_spec_example() {
        // " FSC" 03000000 01000000 01000000 00000000 00000000
        // " LBL" 01000000 03000000 "ABC" " RTS" 02000000 <2 masked units>
        let data = single_entry_buffer("ABC", "Hi");
        let table = StringTable::parse(&data).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.get("ABC").is_some());
    }

    // ========================
    // masking tests
    // ========================

    #[test]
    fn test_mask_is_involution() {
        for unit in [0x0000u16, 0xFFFF, 0x0001, 0x7FFF, 0x8000, 0x1234] {
            assert_eq!(unit ^ CODE_UNIT_MASK ^ CODE_UNIT_MASK, unit);
        }
    }

    #[test]
    fn test_stored_units_are_masked() {
        let mut table = StringTable::new();
        table.insert("k", &[0x0041]);
        let bytes = table.encode();
        // Last two bytes are the masked 'A'.
        let stored = u16::from_le_bytes([bytes[bytes.len() - 2], bytes[bytes.len() - 1]]);
        assert_eq!(stored, 0x0041 ^ 0xFFFF);
    }

    // ========================
    // encode / round-trip tests
    // ========================

    #[test]
    fn test_encode_layout() {
        let mut table = StringTable::new();
        table.insert("ab", &[0x0058]);
        let bytes = table.encode();

        assert_eq!(&bytes[0..4], b" FSC");
        assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()), 3);
        assert_eq!(u32::from_le_bytes(bytes[8..12].try_into().unwrap()), 1);
        assert_eq!(u32::from_le_bytes(bytes[12..16].try_into().unwrap()), 1);
        assert_eq!(&bytes[16..24], &[0; 8]);
        assert_eq!(&bytes[24..28], b" LBL");
        assert_eq!(u32::from_le_bytes(bytes[28..32].try_into().unwrap()), 1);
        assert_eq!(u32::from_le_bytes(bytes[32..36].try_into().unwrap()), 2);
        assert_eq!(&bytes[36..38], b"ab");
        assert_eq!(&bytes[38..42], b" RTS");
        assert_eq!(u32::from_le_bytes(bytes[42..46].try_into().unwrap()), 1);
    }

    #[test]
    fn test_round_trip() {
        let mut table = StringTable::new();
        table.insert("GUI:OK", &"OK".encode_utf16().collect::<Vec<_>>());
        table.insert("GUI:Cancel", &"Cancel".encode_utf16().collect::<Vec<_>>());
        table.insert("empty", &[]);
        table.insert("extremes", &[0x0000, 0xFFFF]);

        let decoded = StringTable::parse(&table.encode()).unwrap();
        assert_eq!(decoded, table);

        // And a second trip for good measure.
        let decoded_again = StringTable::parse(&decoded.encode()).unwrap();
        assert_eq!(decoded_again, decoded);
    }

    #[test]
    fn test_iter_in_label_order() {
        let mut table = StringTable::new();
        table.insert("b", &[1]);
        table.insert("A", &[2]);
        let labels: Vec<&str> = table.iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["a", "b"]);
    }
}
