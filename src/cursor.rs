//! Bounded forward-only cursor over a byte buffer.
//!
//! Every parser in this crate reads through [`ByteCursor`]: a read position
//! over a borrowed, finite byte slice that can never read past the end and
//! never seeks backward. A failed read reports exactly why it failed
//! (truncation vs. wrong bytes) and at what position; after an error the
//! cursor position is unspecified and the cursor must be discarded.
//!
//! # Endianness
//!
//! Both the replay container and the CSF format store multi-byte integers
//! in little-endian byte order. Scalars are decoded with `from_le_bytes`,
//! so behavior is identical on big-endian hosts.
//!
//! # Example
//!
//! ```
//! use ra3_parser::cursor::ByteCursor;
//!
//! let data = [0x26, 0x89, 0x01, 0x00, b'H', b'i'];
//! let mut cursor = ByteCursor::new(&data);
//!
//! assert_eq!(cursor.read_u32_le().unwrap(), 100_646);
//! assert_eq!(cursor.read_bytes(2).unwrap(), b"Hi");
//! assert!(cursor.at_end());
//! ```

use crate::error::{ParserError, Result};

/// A bounded, forward-only read position over a borrowed byte slice.
///
/// The cursor borrows its data and owns nothing; it is cheap to construct
/// and independent cursors over independent buffers may be used from
/// different threads freely. The invariant `position <= data.len()` holds
/// at all times; no operation reads past the end.
///
/// When backward access is needed (e.g. the footer length stored as the
/// last 4 bytes of a file), callers construct a fresh cursor over the
/// sub-range instead of seeking.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteCursor<'a> {
    /// Creates a cursor positioned at the start of `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        ByteCursor { data, position: 0 }
    }

    /// The current read position, in bytes from the start of the buffer.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// The number of unread bytes remaining.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Returns `true` if every byte of the buffer has been consumed.
    #[must_use]
    pub fn at_end(&self) -> bool {
        self.position == self.data.len()
    }

    /// Returns the unread remainder of the buffer without advancing.
    #[must_use]
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.position..]
    }

    /// Compares the next `magic.len()` bytes against an expected literal,
    /// advancing past them on an exact match.
    ///
    /// # Errors
    ///
    /// - [`ParserError::Truncated`] if the input runs out before the
    ///   comparison finishes (more data could still match)
    /// - [`ParserError::MagicMismatch`] if bytes are present but differ
    ///
    /// The distinction matters: a truncation is retryable with a larger
    /// buffer, a mismatch means the wrong file format.
    ///
    /// # Example
    ///
    /// ```
    /// use ra3_parser::cursor::ByteCursor;
    ///
    /// let mut cursor = ByteCursor::new(b" FSC\x03\x00\x00\x00");
    /// cursor.expect_magic(b" FSC").unwrap();
    /// assert_eq!(cursor.position(), 4);
    /// ```
    pub fn expect_magic(&mut self, magic: &[u8]) -> Result<()> {
        let start = self.position;
        let available = self.remaining();
        if available < magic.len() {
            // Only a truncation if the available prefix still matches.
            if self.rest() == &magic[..available] {
                return Err(ParserError::truncated(magic.len(), available));
            }
            return Err(ParserError::magic_mismatch(magic, self.rest(), start));
        }

        let actual = &self.data[start..start + magic.len()];
        if actual != magic {
            return Err(ParserError::magic_mismatch(magic, actual, start));
        }
        self.position += magic.len();
        Ok(())
    }

    /// Reads exactly `len` bytes, advancing past them.
    ///
    /// # Errors
    ///
    /// Returns [`ParserError::Truncated`] if fewer than `len` bytes remain.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(ParserError::truncated(len, self.remaining()));
        }
        let slice = &self.data[self.position..self.position + len];
        self.position += len;
        Ok(slice)
    }

    /// Reads exactly `N` bytes into a fixed-size array.
    ///
    /// # Errors
    ///
    /// Returns [`ParserError::Truncated`] if fewer than `N` bytes remain.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let slice = self.read_bytes(N)?;
        let mut array = [0u8; N];
        array.copy_from_slice(slice);
        Ok(array)
    }

    /// Advances `len` bytes without copying anything.
    ///
    /// # Errors
    ///
    /// Returns [`ParserError::Truncated`] if fewer than `len` bytes remain.
    pub fn skip(&mut self, len: usize) -> Result<()> {
        if self.remaining() < len {
            return Err(ParserError::truncated(len, self.remaining()));
        }
        self.position += len;
        Ok(())
    }

    /// Reads a single byte.
    ///
    /// # Errors
    ///
    /// Returns [`ParserError::Truncated`] at end of input.
    pub fn read_u8(&mut self) -> Result<u8> {
        let bytes = self.read_array::<1>()?;
        Ok(bytes[0])
    }

    /// Reads a little-endian u16.
    ///
    /// # Errors
    ///
    /// Returns [`ParserError::Truncated`] if fewer than 2 bytes remain.
    ///
    /// # Example
    ///
    /// ```
    /// use ra3_parser::cursor::ByteCursor;
    ///
    /// let mut cursor = ByteCursor::new(&[0x34, 0x12]);
    /// assert_eq!(cursor.read_u16_le().unwrap(), 0x1234);
    /// ```
    pub fn read_u16_le(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array::<2>()?))
    }

    /// Reads a little-endian u32.
    ///
    /// # Errors
    ///
    /// Returns [`ParserError::Truncated`] if fewer than 4 bytes remain.
    ///
    /// # Example
    ///
    /// ```
    /// use ra3_parser::cursor::ByteCursor;
    ///
    /// let mut cursor = ByteCursor::new(&[0x78, 0x56, 0x34, 0x12]);
    /// assert_eq!(cursor.read_u32_le().unwrap(), 0x12345678);
    /// ```
    pub fn read_u32_le(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array::<4>()?))
    }

    /// Reads a null-terminated UTF-16LE string as raw code units.
    ///
    /// Consumes 16-bit units until one equals zero. The terminator is
    /// consumed but not included in the result.
    ///
    /// # Errors
    ///
    /// Returns [`ParserError::Truncated`] if the input ends before a
    /// terminator is found.
    ///
    /// # Example
    ///
    /// ```
    /// use ra3_parser::cursor::ByteCursor;
    ///
    /// let data = [b'H', 0, b'i', 0, 0, 0, 0xFF, 0xFF];
    /// let mut cursor = ByteCursor::new(&data);
    /// assert_eq!(cursor.read_wide_cstring().unwrap(), vec![b'H' as u16, b'i' as u16]);
    /// assert_eq!(cursor.position(), 6);
    /// ```
    pub fn read_wide_cstring(&mut self) -> Result<Vec<u16>> {
        let mut units = Vec::new();
        loop {
            let unit = self.read_u16_le()?;
            if unit == 0 {
                return Ok(units);
            }
            units.push(unit);
        }
    }
}
