//! Row kinds

use std::fmt;

/// What a calculation sheet row holds
///
/// Exactly one kind per written row. Section headers populate column A,
/// subsection headers and data rows populate column B, blank separators and
/// sum rows leave both empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RowKind {
    /// Trade section title (column A)
    SectionHeader,
    /// Subsection title (column B)
    SubsectionHeader,
    /// Item row
    Data,
    /// Blank-particulars separator between groups
    Blank,
    /// Subsection total
    Sum,
}

impl RowKind {
    /// Check if this is a header of either level
    pub fn is_header(self) -> bool {
        matches!(self, RowKind::SectionHeader | RowKind::SubsectionHeader)
    }
}

impl fmt::Display for RowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RowKind::SectionHeader => "section header",
            RowKind::SubsectionHeader => "subsection header",
            RowKind::Data => "data",
            RowKind::Blank => "blank",
            RowKind::Sum => "sum",
        };
        f.write_str(name)
    }
}
