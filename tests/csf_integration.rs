//! Integration tests for the CSF string-table codec.
//!
//! All buffers are synthesized in-test; the layouts follow the CSF format
//! as Red Alert 3 writes it.

use ra3_parser::csf::{StringTable, CODE_UNIT_MASK};
use ra3_parser::error::ParserError;

/// Encodes `text` as masked UTF-16LE bytes.
fn masked(text: &str) -> Vec<u8> {
    text.encode_utf16()
        .flat_map(|u| (u ^ CODE_UNIT_MASK).to_le_bytes())
        .collect()
}

/// Builds a CSF buffer with the given entries and count fields.
fn build_csf(entries: &[(&str, &str)], first_count: u32, second_count: u32) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(b" FSC");
    data.extend_from_slice(&3u32.to_le_bytes());
    data.extend_from_slice(&first_count.to_le_bytes());
    data.extend_from_slice(&second_count.to_le_bytes());
    data.extend_from_slice(&[0; 8]);
    for (label, text) in entries {
        data.extend_from_slice(b" LBL");
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&(label.len() as u32).to_le_bytes());
        data.extend_from_slice(label.as_bytes());
        data.extend_from_slice(b" RTS");
        data.extend_from_slice(&(text.encode_utf16().count() as u32).to_le_bytes());
        data.extend_from_slice(&masked(text));
    }
    data
}

// ============================================================================
// Decoding
// ============================================================================

#[test]
fn test_decode_multi_entry_table() {
    let data = build_csf(
        &[
            ("GUI:OK", "OK"),
            ("GUI:Cancel", "Cancel"),
            ("UNIT:Tank", "Hammer Tank"),
        ],
        3,
        3,
    );
    let table = StringTable::parse(&data).unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(table.get_text("gui:ok").as_deref(), Some("OK"));
    assert_eq!(table.get_text("GUI:CANCEL").as_deref(), Some("Cancel"));
    assert_eq!(table.get_text("unit:tank").as_deref(), Some("Hammer Tank"));
}

#[test]
fn test_decode_spec_worked_example() {
    // " FSC" 03000000 01000000 01000000 00000000 00000000
    // " LBL" 01000000 03000000 "ABC" " RTS" 02000000 <2 masked units>
    let data = build_csf(&[("ABC", "Hi")], 1, 1);
    let table = StringTable::parse(&data).unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.get_text("ABC").as_deref(), Some("Hi"));
}

#[test]
fn test_decode_non_ascii_text() {
    let data = build_csf(&[("msg", "Ура! Привет")], 1, 1);
    let table = StringTable::parse(&data).unwrap();
    assert_eq!(table.get_text("msg").as_deref(), Some("Ура! Привет"));
}

#[test]
fn test_decode_empty_text() {
    let data = build_csf(&[("blank", "")], 1, 1);
    let table = StringTable::parse(&data).unwrap();
    assert_eq!(table.get_text("blank").as_deref(), Some(""));
}

// ============================================================================
// Count invariant
// ============================================================================

#[test]
fn test_count_mismatch_fails() {
    for (first, second) in [(1u32, 2u32), (2, 1), (0, 1), (1, 0), (100, 99)] {
        let data = build_csf(&[("ABC", "Hi")], first, second);
        let result = StringTable::parse(&data);
        assert!(
            matches!(result, Err(ParserError::InconsistentCount { .. })),
            "counts {first}/{second} must fail, got {result:?}"
        );
    }
}

#[test]
fn test_count_larger_than_entries_is_truncation() {
    // Both counts agree but promise more entries than the buffer holds.
    let data = build_csf(&[("ABC", "Hi")], 2, 2);
    let result = StringTable::parse(&data);
    assert!(matches!(result, Err(ParserError::Truncated { .. })));
}

#[test]
fn test_count_smaller_than_entries_is_trailing_data() {
    let data = build_csf(&[("a", "x"), ("b", "y")], 1, 1);
    let result = StringTable::parse(&data);
    assert!(matches!(result, Err(ParserError::TrailingData { .. })));
}

// ============================================================================
// Round trip
// ============================================================================

#[test]
fn test_round_trip_identity() {
    let data = build_csf(
        &[("GUI:OK", "OK"), ("a:b", "masked \u{fffd} text"), ("z", "")],
        3,
        3,
    );
    let decoded = StringTable::parse(&data).unwrap();
    let reencoded = decoded.encode();
    let decoded_again = StringTable::parse(&reencoded).unwrap();
    assert_eq!(decoded_again, decoded);
}

#[test]
fn test_encode_of_lowercased_labels_is_stable() {
    // Labels are case-folded at parse time, so a second round trip is
    // byte-identical.
    let data = build_csf(&[("MixedCase:Label", "text")], 1, 1);
    let decoded = StringTable::parse(&data).unwrap();
    let first = decoded.encode();
    let second = StringTable::parse(&first).unwrap().encode();
    assert_eq!(first, second);
}

#[test]
fn test_mask_extremes_survive_round_trip() {
    let mut table = StringTable::new();
    table.insert("edge", &[0x0000, 0xFFFF, 0x8000, 0x7FFF]);
    let decoded = StringTable::parse(&table.encode()).unwrap();
    assert_eq!(decoded.get("edge"), Some(&[0x0000u16, 0xFFFF, 0x8000, 0x7FFF][..]));
}
