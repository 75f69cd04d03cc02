//! Worksheet type

use std::collections::BTreeMap;

use crate::cell::{CellAddress, CellRange, CellWrite};
use crate::column::Column;
use crate::error::{Error, Result};
use crate::row::RowKind;
use crate::style::StyleIntent;
use crate::{MAX_COLS, MAX_ROWS};

/// A worksheet: a sparse grid of [`CellWrite`]s plus per-row metadata
///
/// Storage is ordered by (row, column) so iteration, and therefore any
/// export, is deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct Worksheet {
    /// Sheet name
    name: String,
    /// Cell writes keyed by 0-based (row, col)
    cells: BTreeMap<(u32, u16), CellWrite>,
    /// Row kinds keyed by 1-based row number
    row_kinds: BTreeMap<u32, RowKind>,
    /// Style intent keyed by 1-based row number
    row_styles: BTreeMap<u32, StyleIntent>,
}

impl Worksheet {
    /// Create a new worksheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
            row_kinds: BTreeMap::new(),
            row_styles: BTreeMap::new(),
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name
    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    // === Cell Access ===

    /// Get the write stored at an address
    pub fn cell_at(&self, addr: &CellAddress) -> Option<&CellWrite> {
        self.cells.get(&(addr.row, addr.col))
    }

    /// Get the write stored in a column of a 1-based row
    pub fn get(&self, row_number: u32, column: Column) -> Option<&CellWrite> {
        if row_number == 0 {
            return None;
        }
        self.cells.get(&(row_number - 1, column.index()))
    }

    /// Get a cell by address string (e.g., "I12")
    pub fn cell(&self, address: &str) -> Result<Option<&CellWrite>> {
        let addr = CellAddress::parse(address)?;
        Ok(self.cell_at(&addr))
    }

    /// Formula text stored in a column of a 1-based row, if any
    pub fn formula(&self, row_number: u32, column: Column) -> Option<&str> {
        self.get(row_number, column).and_then(CellWrite::formula_text)
    }

    // === Cell Modification ===

    /// Store a write at an address
    ///
    /// Writing the same content twice is a no-op; writing different content
    /// into an occupied cell is a [`Error::CellConflict`].
    pub fn write_at(&mut self, addr: CellAddress, write: CellWrite) -> Result<()> {
        self.validate_cell_position(addr.row, addr.col)?;

        match self.cells.get(&(addr.row, addr.col)) {
            Some(existing) if *existing == write => Ok(()),
            Some(existing) => Err(Error::CellConflict {
                address: addr.to_a1_string(),
                existing: existing.to_string(),
                incoming: write.to_string(),
            }),
            None => {
                self.cells.insert((addr.row, addr.col), write);
                Ok(())
            }
        }
    }

    /// Store a write in a column of a 1-based row
    pub fn write(&mut self, row_number: u32, column: Column, write: CellWrite) -> Result<()> {
        let addr = column.at(row_number)?;
        self.write_at(addr, write)
    }

    // === Row Metadata ===

    /// Claim a 1-based row as a given kind
    pub fn mark_row(&mut self, row_number: u32, kind: RowKind) -> Result<()> {
        if row_number == 0 || row_number > MAX_ROWS {
            return Err(Error::RowOutOfBounds(row_number, MAX_ROWS));
        }
        match self.row_kinds.get(&row_number) {
            Some(existing) if *existing == kind => Ok(()),
            Some(existing) => Err(Error::RowKindConflict {
                row: row_number,
                existing: *existing,
                incoming: kind,
            }),
            None => {
                self.row_kinds.insert(row_number, kind);
                Ok(())
            }
        }
    }

    /// Kind of a 1-based row, `None` while the row is unwritten
    pub fn row_kind(&self, row_number: u32) -> Option<RowKind> {
        self.row_kinds.get(&row_number).copied()
    }

    /// Check whether a row has been claimed by any writer
    pub fn is_row_written(&self, row_number: u32) -> bool {
        self.row_kinds.contains_key(&row_number)
    }

    /// Iterate (row number, kind) pairs in sheet order
    pub fn rows(&self) -> impl Iterator<Item = (u32, RowKind)> + '_ {
        self.row_kinds.iter().map(|(row, kind)| (*row, *kind))
    }

    /// Attach style intent to a 1-based row
    pub fn set_row_style(&mut self, row_number: u32, style: StyleIntent) {
        if style.is_plain() {
            self.row_styles.remove(&row_number);
        } else {
            self.row_styles.insert(row_number, style);
        }
    }

    /// Style intent of a 1-based row (plain when none was attached)
    pub fn row_style(&self, row_number: u32) -> StyleIntent {
        self.row_styles
            .get(&row_number)
            .copied()
            .unwrap_or_default()
    }

    // === Iteration ===

    /// Iterate all cells in (row, column) order
    pub fn cells(&self) -> impl Iterator<Item = (CellAddress, &CellWrite)> + '_ {
        self.cells
            .iter()
            .map(|((row, col), write)| (CellAddress::new(*row, *col), write))
    }

    /// Iterate the cells of one 1-based row
    pub fn row_cells(&self, row_number: u32) -> impl Iterator<Item = (u16, &CellWrite)> + '_ {
        let row = row_number.saturating_sub(1);
        let valid = row_number > 0;
        self.cells
            .range((row, 0)..=(row, MAX_COLS - 1))
            .filter(move |_| valid)
            .map(|((_, col), write)| (*col, write))
    }

    /// Iterate only formula cells
    pub fn formula_cells(&self) -> impl Iterator<Item = (CellAddress, &str)> + '_ {
        self.cells()
            .filter_map(|(addr, write)| write.formula_text().map(|text| (addr, text)))
    }

    /// Number of stored cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Get the used range (bounds of all stored cells)
    pub fn used_range(&self) -> Option<CellRange> {
        let (first_row, _) = self.cells.keys().next()?;
        let (last_row, _) = self.cells.keys().next_back()?;
        let min_col = self.cells.keys().map(|(_, c)| *c).min()?;
        let max_col = self.cells.keys().map(|(_, c)| *c).max()?;
        Some(CellRange::new(
            CellAddress::new(*first_row, min_col),
            CellAddress::new(*last_row, max_col),
        ))
    }

    fn validate_cell_position(&self, row: u32, col: u16) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_write_and_read() {
        let mut sheet = Worksheet::new("Calc");
        sheet
            .write(12, Column::M, CellWrite::formula("=SUM(M10:M11)"))
            .unwrap();
        assert_eq!(sheet.formula(12, Column::M), Some("=SUM(M10:M11)"));
        assert_eq!(
            sheet.cell("M12").unwrap(),
            Some(&CellWrite::formula("=SUM(M10:M11)"))
        );
        assert_eq!(sheet.get(12, Column::I), None);
        assert_eq!(sheet.get(0, Column::I), None);
    }

    #[test]
    fn test_conflicting_write_rejected() {
        let mut sheet = Worksheet::new("Calc");
        sheet.write(5, Column::C, CellWrite::value(3.0)).unwrap();
        // identical content is accepted
        sheet.write(5, Column::C, CellWrite::value(3.0)).unwrap();

        let err = sheet
            .write(5, Column::C, CellWrite::value(4.0))
            .unwrap_err();
        assert!(matches!(err, Error::CellConflict { .. }));
        assert_eq!(
            sheet.get(5, Column::C),
            Some(&CellWrite::Value(CellValue::Number(3.0)))
        );
    }

    #[test]
    fn test_row_zero_rejected() {
        let mut sheet = Worksheet::new("Calc");
        assert!(sheet.write(0, Column::C, CellWrite::value(1.0)).is_err());
        assert!(sheet.mark_row(0, RowKind::Data).is_err());
    }

    #[test]
    fn test_row_kinds() {
        let mut sheet = Worksheet::new("Calc");
        sheet.mark_row(10, RowKind::Data).unwrap();
        sheet.mark_row(10, RowKind::Data).unwrap();
        assert!(sheet.mark_row(10, RowKind::Sum).is_err());
        assert!(sheet.is_row_written(10));
        assert!(!sheet.is_row_written(11));
        assert_eq!(sheet.rows().collect::<Vec<_>>(), vec![(10, RowKind::Data)]);
    }

    #[test]
    fn test_row_cells_and_used_range() {
        let mut sheet = Worksheet::new("Calc");
        sheet.write(3, Column::B, CellWrite::value("Pile")).unwrap();
        sheet.write(3, Column::I, CellWrite::formula("=H3*C3")).unwrap();
        sheet.write(4, Column::C, CellWrite::value(2.0)).unwrap();

        let cols: Vec<u16> = sheet.row_cells(3).map(|(c, _)| c).collect();
        assert_eq!(cols, vec![1, 8]);
        assert_eq!(sheet.used_range().unwrap().to_string(), "B3:I4");
        assert_eq!(sheet.formula_cells().count(), 1);
    }
}
