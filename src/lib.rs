//! ZABA Statement Library
//!
//! A library for reading Zagrebačka banka spreadsheet statement exports and
//! turning them into normalized transaction records.
//!
//! # Statement layout
//!
//! An export starts with a loose header block (statement period, account
//! number, currency) and continues with a fixed-column transaction table:
//! date, reference, memo, debit, credit, balance and currency.
//!
//! # Output Formats
//!
//! - **OFX**: Open Financial Exchange 2.x XML
//! - **CSV**: Comma-separated values format
//!
//! # Examples
//!
//! ## Converting an export to OFX
//!
//! ```no_run
//! use std::fs::File;
//! use zaba_statement::ofx_format::OfxStatement;
//! use zaba_statement::parser::ParserOptions;
//! use zaba_statement::xls_format::XlsStatement;
//!
//! let xls = XlsStatement::from_path("izvod.xls", ParserOptions::default())?;
//!
//! // Convert using From trait
//! let ofx: OfxStatement = xls.into();
//!
//! let mut output = File::create("izvod.ofx")?;
//! ofx.write_to(&mut output)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Feeding rows directly
//!
//! ```
//! use zaba_statement::cell::{Cell, DateMode};
//! use zaba_statement::parser::{ParserOptions, StatementParser};
//!
//! let rows = vec![
//!     vec![Cell::from("Account: HR1234567890")],
//!     vec![Cell::from("Date")],
//! ];
//! let parser = StatementParser::new(ParserOptions::default())?;
//! let statement = parser.parse(rows, DateMode::Excel1900)?;
//! assert_eq!(statement.header.account_id.as_deref(), Some("HR1234567890"));
//! # Ok::<(), zaba_statement::Error>(())
//! ```

pub mod error;
pub mod types;
pub mod cell;
pub mod header;
pub mod parser;
pub mod xls_format;
pub mod ofx_format;
pub mod csv_format;
pub mod conversion;

use std::str::FromStr;

// Re-export commonly used types
pub use error::{Error, Result};
pub use parser::{ParserOptions, StatementParser};
pub use types::{Statement, StatementHeader, TransactionRecord, TransactionType};

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// OFX 2.x XML
    Ofx,
    /// CSV format
    Csv,
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ofx" | "qfx" => Ok(Format::Ofx),
            "csv" => Ok(Format::Csv),
            _ => Err(Error::InvalidFormat(s.to_string())),
        }
    }
}

impl Format {
    /// Get file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Ofx => "ofx",
            Format::Csv => "csv",
        }
    }
}
