//! Cell value and cell write types

use std::fmt;

/// A literal value stored in a cell
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum CellValue {
    /// Empty cell (no value)
    #[default]
    Empty,

    /// Numeric value
    Number(f64),

    /// Text value
    Text(String),
}

impl CellValue {
    /// Create a new text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        CellValue::Text(s.into())
    }

    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Try to get the value as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get the value as text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Empty => "empty",
            CellValue::Number(_) => "number",
            CellValue::Text(_) => "text",
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

/// What gets written into one cell: a literal value or a formula string.
///
/// Formula text always starts with `=` and uses 1-based `A1` addresses,
/// optionally qualified with a quoted sheet name (`'Sheet'!A1`).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CellWrite {
    /// A literal value
    Value(CellValue),
    /// A spreadsheet formula
    Formula(String),
}

impl CellWrite {
    /// Create a literal write
    pub fn value<V: Into<CellValue>>(value: V) -> Self {
        CellWrite::Value(value.into())
    }

    /// Create a formula write, adding the leading `=` when missing
    pub fn formula<S: Into<String>>(text: S) -> Self {
        let text = text.into();
        if text.starts_with('=') {
            CellWrite::Formula(text)
        } else {
            CellWrite::Formula(format!("={}", text))
        }
    }

    /// Check if this write carries a formula
    pub fn is_formula(&self) -> bool {
        matches!(self, CellWrite::Formula(_))
    }

    /// Get the formula text if this is a formula write
    pub fn formula_text(&self) -> Option<&str> {
        match self {
            CellWrite::Formula(text) => Some(text),
            CellWrite::Value(_) => None,
        }
    }

    /// Get the literal value if this is a value write
    pub fn as_value(&self) -> Option<&CellValue> {
        match self {
            CellWrite::Value(v) => Some(v),
            CellWrite::Formula(_) => None,
        }
    }
}

impl fmt::Display for CellWrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellWrite::Value(v) => write!(f, "{}", v),
            CellWrite::Formula(text) => write!(f, "{}", text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formula_prefix() {
        assert_eq!(
            CellWrite::formula("SUM(M10:M11)"),
            CellWrite::Formula("=SUM(M10:M11)".into())
        );
        assert_eq!(
            CellWrite::formula("=C5").formula_text(),
            Some("=C5")
        );
    }

    #[test]
    fn test_number_display() {
        assert_eq!(CellValue::Number(3.0).to_string(), "3");
        assert_eq!(CellValue::Number(24.75).to_string(), "24.75");
        assert_eq!(CellValue::Empty.to_string(), "");
    }
}
