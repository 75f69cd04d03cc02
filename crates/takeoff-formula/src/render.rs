//! Rendering formula ASTs to spreadsheet formula syntax

use std::fmt;

use takeoff_core::quote_sheet_name;

use crate::ast::{CellReference, FormulaExpr, RangeReference};

impl fmt::Display for FormulaExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaExpr::Number(n) => write!(f, "{}", format_number(*n)),
            FormulaExpr::CellRef(c) => write!(f, "{}", c),
            FormulaExpr::RangeRef(r) => write!(f, "{}", r),
            FormulaExpr::BinaryOp { op, left, right } => {
                write_operand(f, left, *op, false)?;
                f.write_str(op.symbol())?;
                write_operand(f, right, *op, true)
            }
            FormulaExpr::Function { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
        }
    }
}

fn write_operand(
    f: &mut fmt::Formatter<'_>,
    operand: &FormulaExpr,
    parent: crate::ast::BinaryOperator,
    is_right: bool,
) -> fmt::Result {
    if operand.needs_parens(parent, is_right) {
        write!(f, "({})", operand)
    } else {
        write!(f, "{}", operand)
    }
}

impl fmt::Display for CellReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(sheet) = &self.sheet {
            write!(f, "{}!", quote_sheet_name(sheet))?;
        }
        write!(f, "{}", self.address)
    }
}

impl fmt::Display for RangeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(sheet) = &self.sheet {
            write!(f, "{}!", quote_sheet_name(sheet))?;
        }
        write!(f, "{}", self.range)
    }
}

/// Integers render without a decimal point; other values use the shortest
/// representation that round-trips.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{cell, num, pi, sheet_cell};
    use takeoff_core::Column;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_simple_products() {
        let expr = cell(Column::H, 5).unwrap().mul(cell(Column::C, 5).unwrap());
        assert_eq!(expr.to_formula_string(), "=H5*C5");

        let expr = cell(Column::J, 5)
            .unwrap()
            .mul(cell(Column::H, 5).unwrap())
            .div(num(27.0));
        assert_eq!(expr.to_formula_string(), "=J5*H5/27");
    }

    #[test]
    fn test_power_needs_parens() {
        let radius = cell(Column::F, 7).unwrap().div(num(2.0));
        let expr = cell(Column::I, 7)
            .unwrap()
            .mul(pi())
            .mul(radius.pow(num(2.0)))
            .div(num(27.0));
        assert_eq!(expr.to_formula_string(), "=I7*PI()*(F7/2)^2/27");
    }

    #[test]
    fn test_right_operand_grouping() {
        let a = cell(Column::C, 1).unwrap();
        let b = cell(Column::F, 1).unwrap();
        let c = cell(Column::G, 1).unwrap();
        assert_eq!(
            a.clone().div(b.clone().mul(c.clone())).to_string(),
            "C1/(F1*G1)"
        );
        assert_eq!(a.clone().mul(b.clone().mul(c.clone())).to_string(), "C1*F1*G1");
        assert_eq!(a.clone().add(b.clone()).mul(c).to_string(), "(C1+F1)*G1");
        assert_eq!(a.sub(b.sub(num(1.0))).to_string(), "C1-(F1-1)");
    }

    #[test]
    fn test_sheet_reference() {
        let expr = sheet_cell("Calculations Sheet", Column::I, 12).unwrap();
        assert_eq!(expr.to_formula_string(), "='Calculations Sheet'!I12");
    }

    #[test]
    fn test_number_format() {
        assert_eq!(format_number(27.0), "27");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(-3.0), "-3");
    }
}
