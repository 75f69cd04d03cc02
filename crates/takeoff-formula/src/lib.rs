//! # takeoff-formula
//!
//! Formula construction for takeoff-sheets.
//!
//! This crate provides:
//! - A small formula AST ([`FormulaExpr`])
//! - Precedence-aware rendering to spreadsheet syntax (`=J5*H5/27`)
//! - Reference collection, used to decide when a formula's inputs exist
//!
//! ## Example
//!
//! ```rust
//! use takeoff_core::Column;
//! use takeoff_formula::builder::{cell, num};
//!
//! let cy = cell(Column::J, 5)?.mul(cell(Column::H, 5)?).div(num(27.0));
//! assert_eq!(cy.to_formula_string(), "=J5*H5/27");
//! # Ok::<(), takeoff_formula::FormulaError>(())
//! ```

pub mod ast;
pub mod builder;
pub mod error;
pub mod render;

pub use ast::{BinaryOperator, CellReference, FormulaExpr, RangeReference, Reference};
pub use error::{FormulaError, FormulaResult};
pub use render::format_number;
