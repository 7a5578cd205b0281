//! Error types for the zaba-statement library.

use std::io;
use thiserror::Error;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reading a statement workbook or writing output.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred during read or write operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error writing CSV output.
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error writing XML output.
    #[error("XML error: {0}")]
    XmlError(String),

    /// The workbook could not be opened or decoded.
    #[error("Workbook error: {0}")]
    WorkbookError(#[from] calamine::Error),

    /// The workbook has no worksheet to read.
    #[error("Workbook contains no worksheets")]
    EmptyWorkbook,

    /// A header pattern failed to compile.
    #[error("Invalid header pattern: {0}")]
    RegexError(#[from] regex::Error),

    /// A body row is narrower than the field map requires.
    #[error("Cannot find column {column} ({field}) in row {row} of {width} items")]
    MissingColumn {
        row: usize,
        field: &'static str,
        column: usize,
        width: usize,
    },

    /// A transaction was reached before the header named the account.
    #[error("Row {row}: no account number found in the statement header")]
    MissingAccountId { row: usize },

    /// A header period date does not follow `DD.MM.YYYY.`.
    #[error("Row {row}: invalid header date '{value}', expected DD.MM.YYYY.")]
    InvalidHeaderDate { row: usize, value: String },

    /// A cell holds a value of the wrong kind for its field.
    #[error("Row {row}: invalid value for {field}: {value}")]
    InvalidCell {
        row: usize,
        field: &'static str,
        value: String,
    },

    /// A row carries both a debit and a credit amount.
    #[error("Row {row}: both debit ({debit}) and credit ({credit}) are set")]
    AmbiguousAmount {
        row: usize,
        debit: rust_decimal::Decimal,
        credit: rust_decimal::Decimal,
    },

    /// Missing required field.
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Invalid format specified.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}
