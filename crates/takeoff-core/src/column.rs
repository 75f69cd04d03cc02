//! Calculation sheet columns
//!
//! Every calculation sheet shares the same thirteen columns; their meaning
//! is fixed across trades.

use std::fmt;

use crate::cell::CellAddress;
use crate::error::Result;

/// A column of the calculation sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Column {
    /// Estimate (section header text)
    A,
    /// Particulars (subsection header or item description)
    B,
    /// Takeoff count
    C,
    /// Unit
    D,
    /// Quantity multiplier
    E,
    /// Length
    F,
    /// Width
    G,
    /// Height
    H,
    /// Linear feet
    I,
    /// Square feet
    J,
    /// Pounds
    K,
    /// Cubic yards
    L,
    /// Final quantity
    M,
}

impl Column {
    /// All columns in sheet order
    pub const ALL: [Column; 13] = [
        Column::A,
        Column::B,
        Column::C,
        Column::D,
        Column::E,
        Column::F,
        Column::G,
        Column::H,
        Column::I,
        Column::J,
        Column::K,
        Column::L,
        Column::M,
    ];

    /// 0-based column index
    pub const fn index(self) -> u16 {
        self as u16
    }

    /// Column letter as used in formulas
    pub const fn letter(self) -> &'static str {
        match self {
            Column::A => "A",
            Column::B => "B",
            Column::C => "C",
            Column::D => "D",
            Column::E => "E",
            Column::F => "F",
            Column::G => "G",
            Column::H => "H",
            Column::I => "I",
            Column::J => "J",
            Column::K => "K",
            Column::L => "L",
            Column::M => "M",
        }
    }

    /// Header label shown above the column
    pub const fn label(self) -> &'static str {
        match self {
            Column::A => "Estimate",
            Column::B => "Particulars",
            Column::C => "Takeoff",
            Column::D => "Unit",
            Column::E => "QTY",
            Column::F => "Length",
            Column::G => "Width",
            Column::H => "Height",
            Column::I => "FT",
            Column::J => "SQ FT",
            Column::K => "LBS",
            Column::L => "CY",
            Column::M => "QTY",
        }
    }

    /// Look a column up by its 0-based index
    pub fn from_index(index: u16) -> Option<Column> {
        Column::ALL.get(index as usize).copied()
    }

    /// Address of this column on a 1-based sheet row
    pub fn at(self, row_number: u32) -> Result<CellAddress> {
        CellAddress::at_row(row_number, self.index())
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

/// The derived-quantity columns a sum row may total (I..M)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SumColumn {
    /// Linear feet
    Ft,
    /// Square feet
    Sqft,
    /// Pounds
    Lbs,
    /// Cubic yards
    Cy,
    /// Final quantity
    Qty,
}

impl SumColumn {
    /// All summable columns in sheet order
    pub const ALL: [SumColumn; 5] = [
        SumColumn::Ft,
        SumColumn::Sqft,
        SumColumn::Lbs,
        SumColumn::Cy,
        SumColumn::Qty,
    ];

    /// The sheet column backing this quantity
    pub const fn column(self) -> Column {
        match self {
            SumColumn::Ft => Column::I,
            SumColumn::Sqft => Column::J,
            SumColumn::Lbs => Column::K,
            SumColumn::Cy => Column::L,
            SumColumn::Qty => Column::M,
        }
    }

    /// Short name used in proposal output (`FT`, `SQFT`, ...)
    pub const fn name(self) -> &'static str {
        match self {
            SumColumn::Ft => "FT",
            SumColumn::Sqft => "SQFT",
            SumColumn::Lbs => "LBS",
            SumColumn::Cy => "CY",
            SumColumn::Qty => "QTY",
        }
    }

    /// Reverse of [`SumColumn::column`]
    pub fn from_column(column: Column) -> Option<SumColumn> {
        SumColumn::ALL.into_iter().find(|c| c.column() == column)
    }

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for SumColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of summable columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColumnSet(u8);

impl ColumnSet {
    /// The empty set
    pub const EMPTY: ColumnSet = ColumnSet(0);

    /// Every summable column
    pub const ALL: ColumnSet = ColumnSet(0b1_1111);

    /// Build a set from a list of columns
    pub const fn of(columns: &[SumColumn]) -> Self {
        let mut bits = 0u8;
        let mut i = 0;
        while i < columns.len() {
            bits |= columns[i].bit();
            i += 1;
        }
        ColumnSet(bits)
    }

    /// Check membership
    pub const fn contains(self, column: SumColumn) -> bool {
        self.0 & column.bit() != 0
    }

    /// Add a column
    pub fn insert(&mut self, column: SumColumn) {
        self.0 |= column.bit();
    }

    /// Check if the set is empty
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of columns in the set
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Iterate the members in sheet order
    pub fn iter(self) -> impl Iterator<Item = SumColumn> {
        SumColumn::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl FromIterator<SumColumn> for ColumnSet {
    fn from_iter<T: IntoIterator<Item = SumColumn>>(iter: T) -> Self {
        let mut set = ColumnSet::EMPTY;
        for column in iter {
            set.insert(column);
        }
        set
    }
}

impl fmt::Display for ColumnSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|c| c.name()).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}
