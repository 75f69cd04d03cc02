//! # takeoff-core
//!
//! Core data structures for the takeoff calculation workbook.
//!
//! This crate provides the fundamental types used throughout takeoff-sheets:
//! - [`CellWrite`] - A literal value or formula destined for one cell
//! - [`CellAddress`] and [`CellRange`] - 1-based `A1` addressing
//! - [`Column`] - The fixed A..M calculation columns
//! - [`RowKind`] and [`StyleIntent`] - Row metadata
//! - [`Workbook`], [`Worksheet`] - The in-memory workbook model
//! - [`TakeoffRecord`] - A raw input row
//!
//! ## Example
//!
//! ```rust
//! use takeoff_core::{CellWrite, Column, RowKind, Worksheet};
//!
//! let mut sheet = Worksheet::new("Calculations Sheet");
//! sheet.mark_row(12, RowKind::Sum).unwrap();
//! sheet.write(12, Column::M, CellWrite::formula("=SUM(M10:M11)")).unwrap();
//! assert_eq!(sheet.formula(12, Column::M), Some("=SUM(M10:M11)"));
//! ```

pub mod cell;
pub mod column;
pub mod error;
pub mod record;
pub mod row;
pub mod style;
pub mod workbook;
pub mod worksheet;

pub use cell::{quote_sheet_name, CellAddress, CellRange, CellValue, CellWrite};
pub use column::{Column, ColumnSet, SumColumn};
pub use error::{Error, Result};
pub use record::TakeoffRecord;
pub use row::RowKind;
pub use style::{Color, StyleIntent};
pub use workbook::Workbook;
pub use worksheet::Worksheet;

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
