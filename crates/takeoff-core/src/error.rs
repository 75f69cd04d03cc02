//! Error types for takeoff-core

use thiserror::Error;

use crate::row::RowKind;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in takeoff-core
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Invalid cell range format
    #[error("Invalid cell range: {0}")]
    InvalidRange(String),

    /// Row index out of bounds
    #[error("Row index {0} out of bounds (max: {1})")]
    RowOutOfBounds(u32, u32),

    /// Column index out of bounds
    #[error("Column index {0} out of bounds (max: {1})")]
    ColumnOutOfBounds(u16, u16),

    /// Sheet not found by name
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// Invalid sheet name
    #[error("Invalid sheet name: {0}")]
    InvalidSheetName(String),

    /// Duplicate sheet name
    #[error("Sheet name already exists: {0}")]
    DuplicateSheetName(String),

    /// A second, different write targeted an occupied cell
    #[error("Cell {address} already holds '{existing}', refusing '{incoming}'")]
    CellConflict {
        address: String,
        existing: String,
        incoming: String,
    },

    /// A row was claimed as two different kinds
    #[error("Row {row} is already a {existing} row, cannot become a {incoming} row")]
    RowKindConflict {
        row: u32,
        existing: RowKind,
        incoming: RowKind,
    },
}
