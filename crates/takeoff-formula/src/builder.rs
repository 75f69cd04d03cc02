//! Helpers for assembling formula ASTs
//!
//! ```rust
//! use takeoff_core::Column;
//! use takeoff_formula::builder::{cell, column_range, sum};
//!
//! let total = sum(vec![column_range(Column::M, 10, 11).unwrap()]);
//! assert_eq!(total.to_formula_string(), "=SUM(M10:M11)");
//!
//! let ft = cell(Column::H, 10).unwrap().mul(cell(Column::C, 10).unwrap());
//! assert_eq!(ft.to_formula_string(), "=H10*C10");
//! ```

use takeoff_core::{CellRange, Column};

use crate::ast::{BinaryOperator, CellReference, FormulaExpr, RangeReference};
use crate::error::FormulaResult;

/// Same-sheet reference to a column of a 1-based row
pub fn cell(column: Column, row_number: u32) -> FormulaResult<FormulaExpr> {
    Ok(FormulaExpr::CellRef(CellReference {
        sheet: None,
        address: column.at(row_number)?,
    }))
}

/// Cross-sheet reference to a column of a 1-based row
pub fn sheet_cell(sheet: &str, column: Column, row_number: u32) -> FormulaResult<FormulaExpr> {
    Ok(FormulaExpr::CellRef(CellReference {
        sheet: Some(sheet.to_string()),
        address: column.at(row_number)?,
    }))
}

/// Same-sheet single-column range over 1-based rows `first..=last`
pub fn column_range(column: Column, first: u32, last: u32) -> FormulaResult<FormulaExpr> {
    Ok(FormulaExpr::RangeRef(RangeReference {
        sheet: None,
        range: CellRange::column_span(column.index(), first, last)?,
    }))
}

/// Cross-sheet single-column range over 1-based rows `first..=last`
pub fn sheet_range(
    sheet: &str,
    column: Column,
    first: u32,
    last: u32,
) -> FormulaResult<FormulaExpr> {
    Ok(FormulaExpr::RangeRef(RangeReference {
        sheet: Some(sheet.to_string()),
        range: CellRange::column_span(column.index(), first, last)?,
    }))
}

/// Numeric literal
pub fn num(n: f64) -> FormulaExpr {
    FormulaExpr::Number(n)
}

/// `PI()`
pub fn pi() -> FormulaExpr {
    function("PI", Vec::new())
}

/// `SUM(args...)`
pub fn sum(args: Vec<FormulaExpr>) -> FormulaExpr {
    function("SUM", args)
}

/// Generic function call
pub fn function(name: &str, args: Vec<FormulaExpr>) -> FormulaExpr {
    FormulaExpr::Function {
        name: name.to_string(),
        args,
    }
}

#[allow(clippy::should_implement_trait)]
impl FormulaExpr {
    fn binary(self, op: BinaryOperator, right: FormulaExpr) -> FormulaExpr {
        FormulaExpr::BinaryOp {
            op,
            left: Box::new(self),
            right: Box::new(right),
        }
    }

    /// `self + right`
    pub fn add(self, right: FormulaExpr) -> FormulaExpr {
        self.binary(BinaryOperator::Add, right)
    }

    /// `self - right`
    pub fn sub(self, right: FormulaExpr) -> FormulaExpr {
        self.binary(BinaryOperator::Subtract, right)
    }

    /// `self * right`
    pub fn mul(self, right: FormulaExpr) -> FormulaExpr {
        self.binary(BinaryOperator::Multiply, right)
    }

    /// `self / right`
    pub fn div(self, right: FormulaExpr) -> FormulaExpr {
        self.binary(BinaryOperator::Divide, right)
    }

    /// `self ^ right`
    pub fn pow(self, right: FormulaExpr) -> FormulaExpr {
        self.binary(BinaryOperator::Power, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Reference;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_row_zero_is_an_error() {
        assert!(cell(Column::C, 0).is_err());
        assert!(column_range(Column::C, 0, 3).is_err());
    }

    #[test]
    fn test_references_in_evaluation_order() {
        let expr = sum(vec![column_range(Column::L, 40, 42).unwrap()])
            .add(cell(Column::L, 44).unwrap())
            .add(sheet_cell("Other", Column::L, 1).unwrap());
        let refs = expr.references();
        assert_eq!(refs.len(), 3);
        assert!(matches!(refs[0], Reference::Range(r) if r.range.to_string() == "L40:L42"));
        assert!(matches!(refs[1], Reference::Cell(c) if c.sheet.is_none() && c.address.row_number() == 44));
        assert!(matches!(refs[2], Reference::Cell(c) if c.sheet.as_deref() == Some("Other")));
    }

    #[test]
    fn test_cross_sheet_sum() {
        let expr = sum(vec![sheet_range("Calculations Sheet", Column::I, 10, 11).unwrap()]);
        assert_eq!(
            expr.to_formula_string(),
            "=SUM('Calculations Sheet'!I10:I11)"
        );
    }
}
