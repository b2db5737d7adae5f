//! A1-style cell reference codec.
//!
//! Columns are written as a bijective base-26 numeral over `A..=Z`
//! (`A` = 1, `Z` = 26, `AA` = 27); there is no zero digit. Rows follow as
//! plain decimal digits. All coordinates are 1-based.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single cell address, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellRef {
    /// 1-based column (`A` = 1).
    pub column: u32,
    /// 1-based row.
    pub row: u32,
}

impl CellRef {
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Parse a reference such as `AC101`.
    ///
    /// The reference must be one run of uppercase letters followed by one
    /// run of digits, nothing else.
    ///
    /// ```
    /// use unsheet::reference::CellRef;
    ///
    /// let cell = CellRef::parse("AC101")?;
    /// assert_eq!((cell.column, cell.row), (29, 101));
    /// # Ok::<(), unsheet::Error>(())
    /// ```
    pub fn parse(reference: &str) -> Result<Self> {
        let bytes = reference.as_bytes();
        let letters = bytes.iter().take_while(|b| b.is_ascii_uppercase()).count();
        if letters == 0 {
            return Err(Error::invalid_reference(reference, "missing column letters"));
        }
        let digits = bytes[letters..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if digits == 0 {
            return Err(Error::invalid_reference(reference, "missing row digits"));
        }
        if letters + digits != bytes.len() {
            return Err(Error::invalid_reference(
                reference,
                "expected letters followed by digits",
            ));
        }

        let column = decode_column(&reference[..letters])
            .ok_or_else(|| Error::invalid_reference(reference, "column out of range"))?;
        let row = decode_row(&reference[letters..])
            .ok_or_else(|| Error::invalid_reference(reference, "row out of range"))?;
        Ok(Self { column, row })
    }

    /// Format as an A1 reference.
    pub fn to_a1(self) -> String {
        format!("{}{}", column_name(self.column), self.row)
    }
}

impl FromStr for CellRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

fn decode_column(letters: &str) -> Option<u32> {
    letters.bytes().try_fold(0u32, |acc, b| {
        acc.checked_mul(26)?.checked_add(u32::from(b - b'A') + 1)
    })
}

fn decode_row(digits: &str) -> Option<u32> {
    let row = digits.bytes().try_fold(0u32, |acc, b| {
        acc.checked_mul(10)?.checked_add(u32::from(b - b'0'))
    })?;
    (row > 0).then_some(row)
}

/// Decode a run of column letters (`"AC"` → 29).
pub fn column_index(letters: &str) -> Result<u32> {
    if letters.is_empty() || !letters.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(Error::invalid_reference(letters, "expected column letters A-Z"));
    }
    decode_column(letters).ok_or_else(|| Error::invalid_reference(letters, "column out of range"))
}

/// Encode a 1-based column number as letters (`29` → `"AC"`).
///
/// Column 0 has no representation and encodes as an empty string.
pub fn column_name(column: u32) -> String {
    let mut n = column;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// The rectangle a worksheet declares it occupies.
///
/// A worksheet without a `<dimension>` element keeps the all-zero default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_column: u32,
    pub min_row: u32,
    pub max_column: u32,
    pub max_row: u32,
}

impl BoundingBox {
    /// Parse a range such as `A1:AC101`, or a single reference such as `A1`.
    ///
    /// Corners given in reverse order are normalized so min never exceeds max.
    pub fn parse(range: &str) -> Result<Self> {
        let (first, second) = match range.split_once(':') {
            Some((a, b)) => (CellRef::parse(a)?, CellRef::parse(b)?),
            None => {
                let cell = CellRef::parse(range)?;
                (cell, cell)
            }
        };
        Ok(Self::from_corners(first, second))
    }

    /// The smallest box containing both corners.
    pub fn from_corners(a: CellRef, b: CellRef) -> Self {
        Self {
            min_column: a.column.min(b.column),
            min_row: a.row.min(b.row),
            max_column: a.column.max(b.column),
            max_row: a.row.max(b.row),
        }
    }

    /// Whether the box is still the unset default.
    pub fn is_unset(&self) -> bool {
        *self == Self::default()
    }

    pub fn contains(&self, column: u32, row: u32) -> bool {
        (self.min_column..=self.max_column).contains(&column)
            && (self.min_row..=self.max_row).contains(&row)
    }

    /// Number of columns spanned, 0 when unset or when the corners are reversed.
    pub fn width(&self) -> u32 {
        span(self.min_column, self.max_column, self.is_unset())
    }

    /// Number of rows spanned, 0 when unset or when the corners are reversed.
    pub fn height(&self) -> u32 {
        span(self.min_row, self.max_row, self.is_unset())
    }
}

fn span(min: u32, max: u32, unset: bool) -> u32 {
    if unset || max < min {
        0
    } else {
        (max - min).saturating_add(1)
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = CellRef::new(self.min_column, self.min_row);
        let end = CellRef::new(self.max_column, self.max_row);
        if start == end {
            write!(f, "{}", start)
        } else {
            write!(f, "{}:{}", start, end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_column_letters() {
        assert_eq!(column_index("A").unwrap(), 1);
        assert_eq!(column_index("Z").unwrap(), 26);
        assert_eq!(column_index("AA").unwrap(), 27);
        assert_eq!(column_index("AC").unwrap(), 29);
        assert_eq!(column_index("AZ").unwrap(), 52);
        assert_eq!(column_index("BA").unwrap(), 53);
        assert_eq!(column_index("ZZ").unwrap(), 702);
        assert_eq!(column_index("AAA").unwrap(), 703);
        assert_eq!(column_index("XFD").unwrap(), 16384);
        assert!(column_index("").is_err());
        assert!(column_index("a").is_err());
    }

    #[test]
    fn test_column_letters_match_closed_form() {
        // sum of (letter value) * 26^position, letters valued 1..=26
        for letters in ["B", "AB", "QZ", "ZZZ", "ABCD"] {
            let expected = letters
                .bytes()
                .rev()
                .enumerate()
                .map(|(i, b)| u32::from(b - b'A' + 1) * 26u32.pow(i as u32))
                .sum::<u32>();
            assert_eq!(column_index(letters).unwrap(), expected, "{}", letters);
        }
    }

    #[test]
    fn test_column_name() {
        assert_eq!(column_name(1), "A");
        assert_eq!(column_name(26), "Z");
        assert_eq!(column_name(27), "AA");
        assert_eq!(column_name(29), "AC");
        assert_eq!(column_name(702), "ZZ");
        assert_eq!(column_name(703), "AAA");
        assert_eq!(column_name(0), "");
        for column in [1, 25, 26, 27, 51, 52, 53, 676, 677, 702, 703, 16384] {
            assert_eq!(column_index(&column_name(column)).unwrap(), column);
        }
    }

    #[test]
    fn test_parse_reference() {
        assert_eq!(CellRef::parse("AC101").unwrap(), CellRef::new(29, 101));
        assert_eq!(CellRef::parse("A1").unwrap(), CellRef::new(1, 1));
        assert_eq!("B2".parse::<CellRef>().unwrap(), CellRef::new(2, 2));
        assert_eq!(CellRef::new(29, 101).to_string(), "AC101");
    }

    #[test]
    fn test_parse_reference_errors() {
        for bad in ["", "101", "AC", "A1B2", "1A", "a1", "A-1", "A0", "$A$1", "A1 "] {
            let err = CellRef::parse(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Format, "{:?}", bad);
        }
    }

    #[test]
    fn test_parse_reference_overflow() {
        assert!(CellRef::parse("A4294967296").is_err());
        assert!(CellRef::parse("A4294967295").is_ok());
        assert!(CellRef::parse("ZZZZZZZZ1").is_err());
    }

    #[test]
    fn test_bounding_box() {
        let bbox = BoundingBox::parse("A1:AC101").unwrap();
        assert_eq!(
            bbox,
            BoundingBox {
                min_column: 1,
                min_row: 1,
                max_column: 29,
                max_row: 101
            }
        );
        assert_eq!(bbox.width(), 29);
        assert_eq!(bbox.height(), 101);
        assert!(bbox.contains(29, 101));
        assert!(!bbox.contains(30, 1));
        assert_eq!(bbox.to_string(), "A1:AC101");
    }

    #[test]
    fn test_bounding_box_single_cell_and_reversed() {
        let single = BoundingBox::parse("C3").unwrap();
        assert_eq!((single.min_column, single.max_row), (3, 3));
        assert_eq!(single.to_string(), "C3");

        let reversed = BoundingBox::parse("B5:A1").unwrap();
        assert_eq!(reversed, BoundingBox::parse("A1:B5").unwrap());
    }

    #[test]
    fn test_bounding_box_errors() {
        assert!(BoundingBox::parse("A1:").is_err());
        assert!(BoundingBox::parse(":B2").is_err());
        assert!(BoundingBox::parse("A1:B2:C3").is_err());
        assert!(BoundingBox::default().is_unset());
        assert_eq!(BoundingBox::default().width(), 0);
    }

    #[test]
    fn test_bounding_box_span_from_raw_fields() {
        let reversed = BoundingBox {
            min_column: 5,
            min_row: 9,
            max_column: 1,
            max_row: 2,
        };
        assert_eq!(reversed.width(), 0);
        assert_eq!(reversed.height(), 0);

        let full = BoundingBox {
            min_column: 0,
            min_row: 0,
            max_column: u32::MAX,
            max_row: u32::MAX,
        };
        assert_eq!(full.width(), u32::MAX);
        assert_eq!(full.height(), u32::MAX);
    }
}
