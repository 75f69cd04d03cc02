//! Dependency scheduler
//!
//! The main pass hands its writes to a [`Scheduler`]. Sum formulas whose
//! source rows are not all claimed yet (trailing rows such as stair
//! landings run after the rest of their section) are not written; they come
//! back as [`DeferredWrite`] descriptors. [`flush`] later checks them
//! against the finalized sheet and turns them into ordinary writes.

use std::collections::BTreeSet;

use takeoff_core::{CellWrite, Column, RowKind, StyleIntent, Worksheet};
use takeoff_formula::FormulaExpr;
use tracing::debug;

use crate::assign::RowWrites;
use crate::error::{EngineError, Result};

/// Inclusive 1-based row span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowSpan {
    pub first: u32,
    pub last: u32,
}

impl RowSpan {
    /// Span covering both rows, in either order
    pub fn new(a: u32, b: u32) -> Self {
        Self {
            first: a.min(b),
            last: a.max(b),
        }
    }

    /// Whether `row` lies inside the span
    pub fn contains(&self, row: u32) -> bool {
        (self.first..=self.last).contains(&row)
    }
}

/// A single cell write with its 1-based target
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledWrite {
    pub row: u32,
    pub column: Column,
    pub write: CellWrite,
}

/// A sum formula waiting for its source rows
#[derive(Debug, Clone, PartialEq)]
pub struct DeferredWrite {
    pub row: u32,
    pub column: Column,
    pub formula: FormulaExpr,
    /// Range the formula reads
    pub span: RowSpan,
    /// Data rows inside `span` that must be written before the formula is
    pub depends_on: Vec<u32>,
}

/// A claimed row with its metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowClaim {
    pub row: u32,
    pub kind: RowKind,
    pub style: StyleIntent,
}

/// Output of the main pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MainPass {
    /// Rows in the order they were claimed
    pub rows: Vec<RowClaim>,
    /// Writes that were ready during the pass
    pub writes: Vec<ScheduledWrite>,
    /// Writes waiting for later rows
    pub deferred: Vec<DeferredWrite>,
}

/// Collects immediate writes and defers the rest
#[derive(Debug, Default)]
pub struct Scheduler {
    claimed: BTreeSet<u32>,
    pass: MainPass,
}

impl Scheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a row has been claimed so far
    pub fn is_claimed(&self, row: u32) -> bool {
        self.claimed.contains(&row)
    }

    /// Claim a row and queue its cells
    pub fn push_row(&mut self, writes: RowWrites) {
        self.claimed.insert(writes.row);
        self.pass.rows.push(RowClaim {
            row: writes.row,
            kind: writes.kind,
            style: writes.style,
        });
        let row = writes.row;
        self.pass
            .writes
            .extend(writes.cells.into_iter().map(|(column, write)| ScheduledWrite {
                row,
                column,
                write,
            }));
    }

    /// Queue a sum formula, deferring it while any of `depends_on` is unclaimed
    ///
    /// Returns `true` when the write was deferred.
    pub fn submit_sum(
        &mut self,
        row: u32,
        column: Column,
        formula: FormulaExpr,
        span: RowSpan,
        depends_on: Vec<u32>,
    ) -> bool {
        let pending: Vec<u32> = depends_on
            .iter()
            .copied()
            .filter(|r| !self.claimed.contains(r))
            .collect();
        if pending.is_empty() {
            self.pass.writes.push(ScheduledWrite {
                row,
                column,
                write: CellWrite::formula(formula.to_formula_string()),
            });
            false
        } else {
            debug!(row, %column, ?pending, "deferring sum until its rows are written");
            self.pass.deferred.push(DeferredWrite {
                row,
                column,
                formula,
                span,
                depends_on,
            });
            true
        }
    }

    /// End the main pass
    pub fn finish(self) -> MainPass {
        self.pass
    }
}

/// Resolve deferred writes against the finalized sheet
///
/// Every dependency must be a written row by now; one that is not means
/// the producing parser dropped a row, and the whole pass fails.
pub fn flush(sheet: &Worksheet, deferred: Vec<DeferredWrite>) -> Result<Vec<ScheduledWrite>> {
    deferred
        .into_iter()
        .map(|d| {
            let missing: Vec<u32> = d
                .depends_on
                .iter()
                .copied()
                .filter(|&r| !sheet.is_row_written(r))
                .collect();
            if !missing.is_empty() {
                return Err(EngineError::UnresolvedDependency {
                    row: d.row,
                    column: d.column,
                    missing,
                });
            }
            debug!(row = d.row, column = %d.column, "flushing deferred sum");
            Ok(ScheduledWrite {
                row: d.row,
                column: d.column,
                write: CellWrite::formula(d.formula.to_formula_string()),
            })
        })
        .collect()
}
