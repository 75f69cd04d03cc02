//! CSV error types

use thiserror::Error;

/// Result type for CSV operations
pub type CsvResult<T> = std::result::Result<T, CsvError>;

/// Errors that can occur during CSV operations
#[derive(Debug, Error)]
pub enum CsvError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV library error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The header row lacks a column every record needs
    #[error("Missing required header '{0}'")]
    MissingHeader(String),

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] takeoff_core::Error),
}
