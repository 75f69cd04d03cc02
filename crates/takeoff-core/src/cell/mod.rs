//! Cell-related types
//!
//! This module contains:
//! - [`CellValue`] - A literal cell value
//! - [`CellWrite`] - A value or formula destined for one cell
//! - [`CellAddress`] - A cell's location (e.g., "I12")
//! - [`CellRange`] - A range of cells (e.g., "I10:I11")

mod address;
mod value;

pub use address::{quote_sheet_name, CellAddress, CellRange};
pub use value::{CellValue, CellWrite};
