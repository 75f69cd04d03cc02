//! # takeoff-csv
//!
//! CSV input and output for takeoff-sheets: raw takeoff records in,
//! worksheet grids out.

mod error;
mod options;
mod reader;
mod writer;

pub use error::{CsvError, CsvResult};
pub use options::{CsvReadOptions, CsvWriteOptions, LineTerminator};
pub use reader::{normalize_header, CsvReader, REQUIRED_HEADERS};
pub use writer::CsvWriter;
