//! A1-style cell coordinates.
//!
//! Rows and columns are 1-based. Column letters use bijective base-26:
//! there is no zero digit, so 26 is `Z` and 27 is `AA`.

use std::fmt;
use std::str::FromStr;

use crate::common::{Error, Result};

/// Highest row number of an OOXML worksheet.
pub const MAX_ROWS: u32 = 1_048_576;
/// Highest column number of an OOXML worksheet (`XFD`).
pub const MAX_COLUMNS: u32 = 16_384;

/// Check that `row` and `column` lie inside the worksheet limits.
#[inline]
pub fn is_valid(row: u32, column: u32) -> bool {
    (1..=MAX_ROWS).contains(&row) && (1..=MAX_COLUMNS).contains(&column)
}

/// Convert column number to Excel column letters (e.g., 1 -> "A", 26 -> "Z", 27 -> "AA").
///
/// Returns an empty string for column 0.
pub fn column_to_letters(col: u32) -> String {
    let mut buf = [0u8; 8];
    let mut pos = buf.len();
    let mut col = col;

    while col > 0 {
        col -= 1;
        pos -= 1;
        buf[pos] = (col % 26) as u8 + b'A';
        col /= 26;
    }

    // Only ASCII uppercase letters were written.
    buf[pos..].iter().map(|&b| b as char).collect()
}

/// Convert column letters to a column number (e.g., "A" -> 1, "AA" -> 27).
///
/// Letters are case-insensitive. Fails on empty input, non-letters, and
/// columns past [`MAX_COLUMNS`].
pub fn letters_to_column(letters: &str) -> Result<u32> {
    if letters.is_empty() {
        return Err(Error::InvalidReference(letters.to_string()));
    }

    let mut col = 0u32;
    for &byte in letters.as_bytes() {
        if !byte.is_ascii_alphabetic() {
            return Err(Error::InvalidReference(letters.to_string()));
        }
        col = col
            .checked_mul(26)
            .and_then(|c| c.checked_add((byte.to_ascii_uppercase() - b'A' + 1) as u32))
            .filter(|&c| c <= MAX_COLUMNS)
            .ok_or_else(|| Error::InvalidReference(letters.to_string()))?;
    }

    Ok(col)
}

/// Encode a (row, column) pair as a reference string such as `B7`.
pub fn encode(row: u32, column: u32) -> String {
    let mut out = column_to_letters(column);
    out.push_str(itoa::Buffer::new().format(row));
    out
}

/// Decode a reference string such as `B7` into a (row, column) pair.
pub fn decode(reference: &str) -> Result<(u32, u32)> {
    let bytes = reference.as_bytes();
    let split = bytes
        .iter()
        .position(|b| !b.is_ascii_alphabetic())
        .unwrap_or(bytes.len());

    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidReference(reference.to_string()));
    }

    let column =
        letters_to_column(letters).map_err(|_| Error::InvalidReference(reference.to_string()))?;
    let row: u32 = atoi_simd::parse(digits.as_bytes())
        .map_err(|_| Error::InvalidReference(reference.to_string()))?;

    if !is_valid(row, column) {
        return Err(Error::InvalidReference(reference.to_string()));
    }

    Ok((row, column))
}

/// A validated cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    /// Row number (1-based)
    pub row: u32,
    /// Column number (1-based)
    pub column: u32,
}

impl Coordinate {
    /// Create a coordinate, rejecting positions outside the worksheet limits.
    pub fn new(row: u32, column: u32) -> Result<Self> {
        if !is_valid(row, column) {
            return Err(Error::InvalidCoordinate { row, column });
        }
        Ok(Self { row, column })
    }

    /// Reference string for this coordinate (e.g. `C3`).
    pub fn to_reference(&self) -> String {
        encode(self.row, self.column)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_reference())
    }
}

impl FromStr for Coordinate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (row, column) = decode(s)?;
        Ok(Self { row, column })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(encode(1, 1), "A1");
        assert_eq!(encode(1, 26), "Z1");
        assert_eq!(encode(1, 27), "AA1");
        assert_eq!(encode(1, 702), "ZZ1");
        assert_eq!(encode(1, 703), "AAA1");
        assert_eq!(encode(MAX_ROWS, MAX_COLUMNS), "XFD1048576");
    }

    #[test]
    fn test_decode() {
        assert_eq!(decode("B7").unwrap(), (7, 2));
        assert_eq!(decode("aa10").unwrap(), (10, 27));
        assert_eq!(decode("XFD1048576").unwrap(), (MAX_ROWS, MAX_COLUMNS));
    }

    #[test]
    fn test_decode_rejects_malformed() {
        for bad in ["", "A", "7", "7A", "A7B", "A 7", "A-1", "A0", "XFE1", "A1048577", "ÄA1"] {
            let err = decode(bad).unwrap_err();
            assert!(err.is_invalid_coordinate(), "{bad:?} -> {err}");
        }
    }

    #[test]
    fn test_decode_rejects_overflowing_letters() {
        assert!(decode("ZZZZZZZZ1").is_err());
        assert!(decode("A99999999999").is_err());
    }

    #[test]
    fn test_is_valid_bounds() {
        assert!(is_valid(1, 1));
        assert!(is_valid(MAX_ROWS, MAX_COLUMNS));
        assert!(!is_valid(0, 1));
        assert!(!is_valid(1, 0));
        assert!(!is_valid(MAX_ROWS + 1, 1));
        assert!(!is_valid(1, MAX_COLUMNS + 1));
    }

    #[test]
    fn test_coordinate_parse_and_display() {
        let c: Coordinate = "C3".parse().unwrap();
        assert_eq!(c, Coordinate { row: 3, column: 3 });
        assert_eq!(c.to_string(), "C3");
        assert!(Coordinate::new(0, 3).is_err());
    }

    proptest! {
        #[test]
        fn prop_encode_decode_round_trip(row in 1..=MAX_ROWS, col in 1..=MAX_COLUMNS) {
            prop_assert_eq!(decode(&encode(row, col)).unwrap(), (row, col));
        }

        #[test]
        fn prop_letters_round_trip(col in 1..=MAX_COLUMNS) {
            prop_assert_eq!(letters_to_column(&column_to_letters(col)).unwrap(), col);
        }
    }
}
