//! CSV reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::options::CsvReadOptions;
use takeoff_core::TakeoffRecord;

/// Headers every takeoff export must carry, in normalized form
pub const REQUIRED_HEADERS: [&str; 3] = ["digitizer item", "estimate", "page"];

/// Lowercase a header and collapse its whitespace
pub fn normalize_header(header: &str) -> String {
    header
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Positions of the named columns in a header row
struct Layout {
    description: usize,
    estimate: usize,
    page: usize,
    /// Every other column, in header order
    values: Vec<usize>,
}

impl Layout {
    fn from_headers(headers: &csv::StringRecord) -> CsvResult<Layout> {
        let normalized: Vec<String> = headers.iter().map(normalize_header).collect();
        let find = |name: &str| {
            normalized
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| CsvError::MissingHeader(name.to_string()))
        };
        let [description, estimate, page] = [
            find(REQUIRED_HEADERS[0])?,
            find(REQUIRED_HEADERS[1])?,
            find(REQUIRED_HEADERS[2])?,
        ];
        let values = (0..normalized.len())
            .filter(|i| ![description, estimate, page].contains(i))
            .collect();
        Ok(Layout {
            description,
            estimate,
            page,
            values,
        })
    }
}

/// Takeoff export reader
pub struct CsvReader;

impl CsvReader {
    /// Read takeoff records from a CSV file
    pub fn read_file<P: AsRef<Path>>(
        path: P,
        options: &CsvReadOptions,
    ) -> CsvResult<Vec<TakeoffRecord>> {
        let file = File::open(path)?;
        Self::read(file, options)
    }

    /// Read takeoff records from a reader
    ///
    /// The first row must be a header naming at least the
    /// [`REQUIRED_HEADERS`]; names match case- and whitespace-insensitively.
    pub fn read<R: Read>(reader: R, options: &CsvReadOptions) -> CsvResult<Vec<TakeoffRecord>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let layout = Layout::from_headers(csv_reader.headers()?)?;

        let mut records = Vec::new();
        for (idx, result) in csv_reader.records().enumerate() {
            let row = result?;
            if options.skip_blank_rows && row.iter().all(|f| f.trim().is_empty()) {
                continue;
            }
            let field = |i: usize| row.get(i).unwrap_or("").trim().to_string();
            records.push(TakeoffRecord {
                line: idx + 1,
                description: field(layout.description),
                estimate: field(layout.estimate),
                page: field(layout.page),
                values: layout
                    .values
                    .iter()
                    .map(|&i| Self::parse_number(row.get(i).unwrap_or("")))
                    .collect(),
            });
        }
        Ok(records)
    }

    /// Parse a numeric field, tolerating thousands separators
    fn parse_number(field: &str) -> Option<f64> {
        let field = field.trim();
        if field.is_empty() {
            return None;
        }
        field.replace(',', "").parse::<f64>().ok()
    }
}
