//! Engine error types

use thiserror::Error;

use takeoff_core::Column;
use takeoff_formula::FormulaError;

use crate::item::{ItemType, Section};

/// Result type alias using [`EngineError`]
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that abort a pass
///
/// Per-cell problems never show up here; they are collected as
/// [`SkippedWrite`](crate::pipeline::SkippedWrite)s instead.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An item type reached a section that has no builder for it
    #[error("No builder registered for {item_type} in section {section}")]
    NoBuilder { section: Section, item_type: ItemType },

    /// A deferred sum still depends on rows nothing wrote
    #[error("Deferred write {column}{row} depends on unwritten rows {missing:?}")]
    UnresolvedDependency {
        row: u32,
        column: Column,
        missing: Vec<u32>,
    },

    /// Workbook model error
    #[error("Workbook error: {0}")]
    Workbook(#[from] takeoff_core::Error),

    /// Formula construction error
    #[error("Formula error: {0}")]
    Formula(#[from] FormulaError),

    /// Invalid engine options
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl EngineError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        EngineError::Config(msg.into())
    }
}
