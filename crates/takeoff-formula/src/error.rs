//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur while building formulas
#[derive(Debug, Error)]
pub enum FormulaError {
    /// A reference could not be formed (row 0, column out of range, ...)
    #[error("Invalid reference: {0}")]
    InvalidReference(#[from] takeoff_core::Error),

    /// A formula needs an input the row does not have
    #[error("Missing operand: {0}")]
    MissingOperand(String),
}
