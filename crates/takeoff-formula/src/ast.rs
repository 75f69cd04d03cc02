//! Formula Abstract Syntax Tree types


use takeoff_core::{CellAddress, CellRange};

/// Formula expression AST
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaExpr {
    /// Numeric literal
    Number(f64),

    /// Single cell reference
    CellRef(CellReference),
    /// Range reference
    RangeRef(RangeReference),

    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<FormulaExpr>,
        right: Box<FormulaExpr>,
    },

    /// Function call
    Function { name: String, args: Vec<FormulaExpr> },
}

/// Cell reference with optional sheet
#[derive(Debug, Clone, PartialEq)]
pub struct CellReference {
    pub sheet: Option<String>,
    pub address: CellAddress,
}

/// Range reference with optional sheet
#[derive(Debug, Clone, PartialEq)]
pub struct RangeReference {
    pub sheet: Option<String>,
    pub range: CellRange,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl BinaryOperator {
    /// Operator symbol
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Power => "^",
        }
    }

    /// Binding strength; higher binds tighter
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Add | BinaryOperator::Subtract => 1,
            BinaryOperator::Multiply | BinaryOperator::Divide => 2,
            BinaryOperator::Power => 3,
        }
    }

    /// Whether `a op (b op c)` equals `(a op b) op c`
    fn is_associative(self) -> bool {
        matches!(self, BinaryOperator::Add | BinaryOperator::Multiply)
    }
}

/// Something a formula reads from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reference<'a> {
    Cell(&'a CellReference),
    Range(&'a RangeReference),
}

impl FormulaExpr {
    /// Collect every reference in evaluation order
    pub fn references(&self) -> Vec<Reference<'_>> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<Reference<'a>>) {
        match self {
            FormulaExpr::Number(_) => {}
            FormulaExpr::CellRef(c) => out.push(Reference::Cell(c)),
            FormulaExpr::RangeRef(r) => out.push(Reference::Range(r)),
            FormulaExpr::BinaryOp { left, right, .. } => {
                left.collect_references(out);
                right.collect_references(out);
            }
            FormulaExpr::Function { args, .. } => {
                for arg in args {
                    arg.collect_references(out);
                }
            }
        }
    }

    /// Render as formula text, including the leading `=`
    pub fn to_formula_string(&self) -> String {
        format!("={}", self)
    }

    pub(crate) fn precedence(&self) -> u8 {
        match self {
            FormulaExpr::BinaryOp { op, .. } => op.precedence(),
            _ => u8::MAX,
        }
    }

    /// Whether this child needs parentheses under `parent`
    pub(crate) fn needs_parens(&self, parent: BinaryOperator, is_right: bool) -> bool {
        let own = self.precedence();
        let parent_prec = parent.precedence();
        if own < parent_prec {
            return true;
        }
        if own == parent_prec && is_right {
            // a-(b-c), a/(b*c): only associative operators may drop them
            return !parent.is_associative() || self.binary_op() != Some(parent);
        }
        false
    }

    fn binary_op(&self) -> Option<BinaryOperator> {
        match self {
            FormulaExpr::BinaryOp { op, .. } => Some(*op),
            _ => None,
        }
    }
}
