//! # takeoff
//!
//! Builds a calculation workbook and a bid proposal from a construction
//! takeoff.
//!
//! The engine takes the raw digitizer rows ([`TakeoffRecord`]) together with
//! the typed items an upstream parser derived from them ([`ParsedItem`]) and:
//!
//! - routes every item to a row builder ([`classify`])
//! - fills each row with values and formulas ([`assign`])
//! - writes subsection totals, deferring the ones whose rows come later
//!   ([`schedule`])
//! - picks the summed columns for each subsection ([`rules`])
//! - groups the finalized rows and turns each group into a proposal line
//!   ([`group`], [`proposal`])
//!
//! ## Example
//!
//! ```rust
//! use takeoff::prelude::*;
//!
//! let items = vec![
//!     ParsedItem::new(Section::Soe, "Heel blocks", ItemType::SubsectionHeader, 9, "Heel blocks"),
//!     ParsedItem::new(Section::Soe, "Heel blocks", ItemType::HeelBlock, 10, "Heel block 4'x4'")
//!         .takeoff(3.0)
//!         .dims(Some(4.0), Some(4.0), Some(2.0)),
//!     ParsedItem::new(Section::Soe, "Heel blocks", ItemType::HeelBlock, 11, "Heel block 5'x5'")
//!         .takeoff(5.0)
//!         .dims(Some(5.0), Some(5.0), Some(2.0)),
//!     ParsedItem::new(Section::Soe, "Heel blocks", ItemType::Sum, 12, ""),
//! ];
//!
//! let output = Pipeline::new(EngineOptions::default())
//!     .run(Vec::new(), &items)
//!     .unwrap();
//!
//! let sheet = output.calculation_sheet().unwrap();
//! assert_eq!(sheet.formula(12, Column::M), Some("=SUM(M10:M11)"));
//! assert_eq!(output.proposal.len(), 1);
//! ```

pub mod assign;
pub mod classify;
pub mod dims;
pub mod error;
pub mod extract;
pub mod group;
pub mod item;
pub mod options;
pub mod pipeline;
pub mod prelude;
pub mod proposal;
pub mod reference;
pub mod rules;
pub mod schedule;

pub use classify::{classify, Builder, Phase, Route};
pub use error::{EngineError, Result};
pub use group::{Family, Group, GroupIndex, SumAnchor};
pub use item::{ItemType, ParsedData, ParsedItem, Section, Unit};
pub use options::EngineOptions;
pub use pipeline::{Pipeline, PipelineContext, PipelineOutput, SkippedWrite};
pub use proposal::{ProposalLine, UnresolvedPlaceholder};
pub use rules::{Rule, RuleSource, RuleTable};
pub use schedule::{DeferredWrite, MainPass, RowSpan, ScheduledWrite, Scheduler};

// Re-export the workbook model and CSV I/O
pub use takeoff_core::{
    CellAddress, CellRange, CellValue, CellWrite, Color, Column, ColumnSet, RowKind, StyleIntent,
    SumColumn, TakeoffRecord, Workbook, Worksheet,
};
pub use takeoff_csv::{CsvReadOptions, CsvReader, CsvWriteOptions, CsvWriter};
pub use takeoff_formula::FormulaExpr;
