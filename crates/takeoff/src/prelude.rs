//! Prelude module - common imports for takeoff users
//!
//! ```rust
//! use takeoff::prelude::*;
//! ```

pub use crate::{
    // Workbook model
    CellWrite,
    Column,
    ColumnSet,
    RowKind,
    SumColumn,
    TakeoffRecord,
    Workbook,
    Worksheet,

    // Input items
    ItemType,
    ParsedItem,
    Section,
    Unit,

    // Engine
    EngineError,
    EngineOptions,
    Pipeline,
    PipelineOutput,
    ProposalLine,
    RuleTable,

    // CSV I/O
    CsvReader,
    CsvWriter,
};
