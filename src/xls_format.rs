//! Spreadsheet statement reader.
//!
//! ZABA exports statements as XLS workbooks. Only the first worksheet is
//! read; every row is handed to the [`StatementParser`].

use crate::cell::{Cell, DateMode};
use crate::error::{Error, Result};
use crate::parser::{ParserOptions, StatementParser};
use crate::types::Statement;
use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;
use tracing::debug;

/// Represents a statement read from a spreadsheet export.
#[derive(Debug, Clone, PartialEq)]
pub struct XlsStatement {
    /// The underlying statement data.
    pub statement: Statement,
}

impl XlsStatement {
    /// Read a statement from an `.xls`, `.xlsx` or `.ods` file.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use zaba_statement::parser::ParserOptions;
    /// use zaba_statement::xls_format::XlsStatement;
    ///
    /// let xls = XlsStatement::from_path("izvod.xls", ParserOptions::default())?;
    /// println!("Account: {:?}", xls.statement.header.account_id);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_path<P: AsRef<Path>>(path: P, options: ParserOptions) -> Result<Self> {
        let path = path.as_ref();
        let range = {
            let mut workbook = open_workbook_auto(path)?;
            workbook.worksheet_range_at(0).ok_or(Error::EmptyWorkbook)??
        };
        debug!(path = %path.display(), rows = range.height(), "read first worksheet");

        Self::from_range(&range, options)
    }

    /// Parse an already loaded worksheet.
    pub fn from_range(range: &Range<Data>, options: ParserOptions) -> Result<Self> {
        let parser = StatementParser::new(options)?;
        // calamine resolves date cells itself, so no serials reach the parser.
        let statement = parser.parse(sheet_rows(range), DateMode::Excel1900)?;
        Ok(XlsStatement { statement })
    }
}

/// Rows of a worksheet, positioned as on the sheet.
///
/// calamine trims leading empty rows and columns from the used range; they
/// are restored here so column indexes and row numbers match the file.
pub fn sheet_rows(range: &Range<Data>) -> impl Iterator<Item = Vec<Cell>> + '_ {
    let (first_row, first_col) = range
        .start()
        .map(|(row, col)| (row as usize, col as usize))
        .unwrap_or((0, 0));

    let leading = std::iter::repeat_with(Vec::<Cell>::new).take(first_row);
    let rows = range.rows().map(move |row| {
        std::iter::repeat(Cell::Empty)
            .take(first_col)
            .chain(row.iter().map(cell_from_data))
            .collect::<Vec<Cell>>()
    });
    leading.chain(rows)
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) if dt.is_datetime() => dt
            .as_datetime()
            .map(Cell::DateTime)
            .unwrap_or_else(|| Cell::Date(dt.as_f64())),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(Cell::DateTime)
            .unwrap_or_else(|| Cell::Text(s.clone())),
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Error(e.to_string()),
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    s.parse::<NaiveDateTime>()
        .ok()
        .or_else(|| s.parse::<NaiveDate>().ok()?.and_hms_opt(0, 0, 0))
}
