//! Raw takeoff records

/// One raw input row as extracted from the drawings
///
/// Records are immutable once read. Besides the three named columns the
/// row carries its remaining numeric fields positionally, in header order.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TakeoffRecord {
    /// 1-based line of the record in its source (header excluded)
    pub line: usize,
    /// `digitizer item` column: free-text item description
    pub description: String,
    /// `estimate` column: estimate category
    pub estimate: String,
    /// `page` column: drawing reference the item was taken from
    pub page: String,
    /// Remaining columns, parsed as numbers where possible
    pub values: Vec<Option<f64>>,
}

impl TakeoffRecord {
    /// Positional numeric field, `None` when absent or not numeric
    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }
}
