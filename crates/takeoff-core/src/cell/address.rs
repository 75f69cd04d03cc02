//! Cell address and range types

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// A cell address (e.g., "I12", "$B$2")
///
/// Rows are stored 0-based; everything that talks to a calculation sheet
/// (row numbers handed over by the upstream parsers, formula text) is
/// 1-based, so prefer [`CellAddress::at_row`] when building from a row number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ...)
    pub col: u16,
    /// Whether the row reference is absolute ($)
    pub row_absolute: bool,
    /// Whether the column reference is absolute ($)
    pub col_absolute: bool,
}

impl CellAddress {
    /// Create a new cell address with relative references (0-based indices)
    pub fn new(row: u32, col: u16) -> Self {
        Self {
            row,
            col,
            row_absolute: false,
            col_absolute: false,
        }
    }

    /// Create an absolute cell address ($A$1 style)
    pub fn absolute(row: u32, col: u16) -> Self {
        Self {
            row,
            col,
            row_absolute: true,
            col_absolute: true,
        }
    }

    /// Create an address from a 1-based sheet row number and a column index
    ///
    /// Row number 0 does not exist on a sheet and is rejected.
    pub fn at_row(row_number: u32, col: u16) -> Result<Self> {
        if row_number == 0 {
            return Err(Error::InvalidAddress(format!(
                "row number must be >= 1 (column {})",
                Self::column_to_letters(col)
            )));
        }
        if row_number > MAX_ROWS {
            return Err(Error::RowOutOfBounds(row_number - 1, MAX_ROWS - 1));
        }
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
        }
        Ok(Self::new(row_number - 1, col))
    }

    /// The 1-based row number as shown on the sheet
    pub fn row_number(&self) -> u32 {
        self.row + 1
    }

    /// Parse a cell address from A1-style notation
    ///
    /// # Examples
    /// ```
    /// use takeoff_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("M12").unwrap();
    /// assert_eq!(addr.row, 11);
    /// assert_eq!(addr.col, 12);
    /// assert_eq!(addr.row_number(), 12);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let bytes = s.as_bytes();
        let mut pos = 0;

        let col_absolute = bytes.first() == Some(&b'$');
        if col_absolute {
            pos += 1;
        }

        let col_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
            pos += 1;
        }
        if pos == col_start {
            return Err(Error::InvalidAddress(format!(
                "no column letters in '{}'",
                s
            )));
        }
        let col = Self::letters_to_column(&s[col_start..pos])?;

        let row_absolute = bytes.get(pos) == Some(&b'$');
        if row_absolute {
            pos += 1;
        }

        let row_str = &s[pos..];
        if row_str.is_empty() {
            return Err(Error::InvalidAddress(format!("no row number in '{}'", s)));
        }
        let row: u32 = row_str
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("invalid row number in '{}'", s)))?;

        let mut addr = Self::at_row(row, col)
            .map_err(|_| Error::InvalidAddress(format!("row out of range in '{}'", s)))?;
        addr.row_absolute = row_absolute;
        addr.col_absolute = col_absolute;
        Ok(addr)
    }

    /// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
    pub fn column_to_letters(col: u16) -> String {
        let mut result = String::new();
        let mut n = col as u32 + 1;

        while n > 0 {
            n -= 1;
            result.insert(0, ((n % 26) as u8 + b'A') as char);
            n /= 26;
        }

        result
    }

    /// Convert column letters to index (A = 0, Z = 25, AA = 26, etc.)
    pub fn letters_to_column(letters: &str) -> Result<u16> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("empty column letters".into()));
        }

        let mut col: u32 = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidAddress(format!(
                    "invalid column letter '{}'",
                    c
                )));
            }
            col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
            if col > MAX_COLS as u32 {
                return Err(Error::InvalidAddress(format!(
                    "column '{}' out of range",
                    letters
                )));
            }
        }

        Ok((col - 1) as u16)
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        let mut result = String::new();
        if self.col_absolute {
            result.push('$');
        }
        result.push_str(&Self::column_to_letters(self.col));
        if self.row_absolute {
            result.push('$');
        }
        result.push_str(&self.row_number().to_string());
        result
    }

    /// Format as a reference qualified with a sheet name (`'Sheet'!A1`)
    pub fn to_sheet_string(&self, sheet: &str) -> String {
        format!("{}!{}", quote_sheet_name(sheet), self.to_a1_string())
    }

    /// Create a range from this address to another
    pub fn to(&self, other: CellAddress) -> CellRange {
        CellRange::new(*self, other)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Quote a sheet name for use in a cross-sheet reference.
///
/// Names are always wrapped in single quotes, embedded quotes are doubled.
pub fn quote_sheet_name(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

/// A rectangular range of cells (e.g., "I10:I11")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    /// Start address (top-left)
    pub start: CellAddress,
    /// End address (bottom-right)
    pub end: CellAddress,
}

impl CellRange {
    /// Create a new cell range, normalized so `start` is the top-left corner
    pub fn new(start: CellAddress, end: CellAddress) -> Self {
        let (start_row, end_row) = if start.row <= end.row {
            (start.row, end.row)
        } else {
            (end.row, start.row)
        };
        let (start_col, end_col) = if start.col <= end.col {
            (start.col, end.col)
        } else {
            (end.col, start.col)
        };

        Self {
            start: CellAddress {
                row: start_row,
                col: start_col,
                ..start
            },
            end: CellAddress {
                row: end_row,
                col: end_col,
                ..end
            },
        }
    }

    /// A single-column range over 1-based row numbers `first..=last`
    pub fn column_span(col: u16, first_row: u32, last_row: u32) -> Result<Self> {
        Ok(Self::new(
            CellAddress::at_row(first_row, col)?,
            CellAddress::at_row(last_row, col)?,
        ))
    }

    /// Parse a range from A1:B10 notation
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.split_once(':') {
            Some((start, end)) => Ok(Self::new(
                CellAddress::parse(start)?,
                CellAddress::parse(end)?,
            )),
            None => {
                let addr = CellAddress::parse(s)?;
                Ok(Self::new(addr, addr))
            }
        }
    }

    /// Check if a cell is within this range
    pub fn contains(&self, addr: &CellAddress) -> bool {
        addr.row >= self.start.row
            && addr.row <= self.end.row
            && addr.col >= self.start.col
            && addr.col <= self.end.col
    }

    /// 1-based row numbers covered by the range
    pub fn row_numbers(&self) -> std::ops::RangeInclusive<u32> {
        self.start.row_number()..=self.end.row_number()
    }

    /// Get the number of rows in the range
    pub fn row_count(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Format as A1:B10 string
    pub fn to_a1_string(&self) -> String {
        if self.start == self.end {
            self.start.to_a1_string()
        } else {
            format!("{}:{}", self.start.to_a1_string(), self.end.to_a1_string())
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_column_to_letters() {
        assert_eq!(CellAddress::column_to_letters(0), "A");
        assert_eq!(CellAddress::column_to_letters(12), "M");
        assert_eq!(CellAddress::column_to_letters(25), "Z");
        assert_eq!(CellAddress::column_to_letters(26), "AA");
        assert_eq!(CellAddress::column_to_letters(16383), "XFD");
    }

    #[test]
    fn test_letters_to_column() {
        assert_eq!(CellAddress::letters_to_column("A").unwrap(), 0);
        assert_eq!(CellAddress::letters_to_column("m").unwrap(), 12);
        assert_eq!(CellAddress::letters_to_column("AA").unwrap(), 26);
        assert!(CellAddress::letters_to_column("XFE").is_err());
    }

    #[test]
    fn test_at_row_is_one_based() {
        let addr = CellAddress::at_row(12, 8).unwrap();
        assert_eq!(addr.to_string(), "I12");
        assert_eq!(addr.row, 11);
        assert!(CellAddress::at_row(0, 0).is_err());
    }

    #[test]
    fn test_parse_roundtrip_display() {
        for text in ["A1", "$B$2", "L10", "M11"] {
            assert_eq!(CellAddress::parse(text).unwrap().to_string(), text);
        }
        assert!(CellAddress::parse("").is_err());
        assert!(CellAddress::parse("A0").is_err());
        assert!(CellAddress::parse("12").is_err());
    }

    #[test]
    fn test_sheet_qualified() {
        let addr = CellAddress::at_row(12, 8).unwrap();
        assert_eq!(
            addr.to_sheet_string("Calculations Sheet"),
            "'Calculations Sheet'!I12"
        );
        assert_eq!(quote_sheet_name("Bob's"), "'Bob''s'");
    }

    #[test]
    fn test_column_span() {
        let range = CellRange::column_span(12, 10, 11).unwrap();
        assert_eq!(range.to_string(), "M10:M11");
        assert_eq!(range.row_numbers().collect::<Vec<_>>(), vec![10, 11]);
        assert!(range.contains(&CellAddress::at_row(11, 12).unwrap()));
        assert!(!range.contains(&CellAddress::at_row(12, 12).unwrap()));
    }
}
