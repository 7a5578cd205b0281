//! Format conversion traits.
//!
//! A statement read from a workbook converts into any output format using
//! Rust's `From` trait.

use crate::csv_format::CsvStatement;
use crate::ofx_format::OfxStatement;
use crate::xls_format::XlsStatement;

/// Convert a workbook statement to OFX.
impl From<XlsStatement> for OfxStatement {
    fn from(xls: XlsStatement) -> Self {
        OfxStatement {
            statement: xls.statement,
        }
    }
}

/// Convert a workbook statement to CSV.
impl From<XlsStatement> for CsvStatement {
    fn from(xls: XlsStatement) -> Self {
        CsvStatement {
            statement: xls.statement,
        }
    }
}
