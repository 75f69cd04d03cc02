//! CSV writer

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::CsvResult;
use crate::options::{CsvWriteOptions, LineTerminator};
use takeoff_core::{CellAddress, Worksheet};

/// Worksheet CSV writer
pub struct CsvWriter;

impl CsvWriter {
    /// Write a worksheet to a CSV file
    pub fn write_file<P: AsRef<Path>>(
        worksheet: &Worksheet,
        path: P,
        options: &CsvWriteOptions,
    ) -> CsvResult<()> {
        let file = File::create(path)?;
        Self::write(worksheet, file, options)
    }

    /// Write a worksheet to a writer
    ///
    /// The grid starts at `A1` so CSV line `n` is sheet row `n`. Formulas
    /// are written as their text.
    pub fn write<W: Write>(
        worksheet: &Worksheet,
        writer: W,
        options: &CsvWriteOptions,
    ) -> CsvResult<()> {
        let terminator = match options.line_terminator {
            LineTerminator::LF => csv::Terminator::Any(b'\n'),
            LineTerminator::CRLF => csv::Terminator::CRLF,
        };

        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .terminator(terminator)
            .flexible(false)
            .from_writer(writer);

        if let Some(range) = worksheet.used_range() {
            let width = range.end.col + 1;
            if options.write_header {
                let header: Vec<String> = (0..width).map(CellAddress::column_to_letters).collect();
                csv_writer.write_record(&header)?;
            }
            for row in 0..=range.end.row {
                let record: Vec<String> = (0..width)
                    .map(|col| {
                        worksheet
                            .cell_at(&CellAddress::new(row, col))
                            .map(|write| write.to_string())
                            .unwrap_or_default()
                    })
                    .collect();
                csv_writer.write_record(&record)?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use takeoff_core::{CellWrite, Column, RowKind};

    fn render(sheet: &Worksheet, options: &CsvWriteOptions) -> String {
        let mut out = Vec::new();
        CsvWriter::write(sheet, &mut out, options).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_write_grid_from_a1() {
        let mut sheet = Worksheet::new("Calc");
        sheet.mark_row(2, RowKind::Data).unwrap();
        sheet.write(2, Column::B, CellWrite::value("Waler")).unwrap();
        sheet.write(2, Column::C, CellWrite::formula("=1+1")).unwrap();
        assert_eq!(render(&sheet, &CsvWriteOptions::default()), ",,\n,Waler,=1+1\n");
    }

    #[test]
    fn test_write_header_and_empty_sheet() {
        let mut sheet = Worksheet::new("Calc");
        assert_eq!(render(&sheet, &CsvWriteOptions::default()), "");

        sheet.write(1, Column::B, CellWrite::value("x")).unwrap();
        let options = CsvWriteOptions {
            write_header: true,
            ..CsvWriteOptions::default()
        };
        assert_eq!(render(&sheet, &options), "A,B\n,x\n");
    }
}
